mod cli;
mod commands;
mod config;
mod error;
mod hooks;
mod locator;
mod output;
mod templates;
mod xpr;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use config::Config;
use error::{EXIT_SUCCESS, EXIT_USAGE};
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Usage problems go to stdout with the usage exit code
        Err(err) if err.use_stderr() => {
            output::banner();
            print!("{}", err.render());
            process::exit(EXIT_USAGE);
        }
        Err(err) => err.exit(),
    };

    if !matches!(cli.command, Commands::Status { json: true }) {
        output::banner();
    }

    let code = match run(cli.command) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => report(&err),
    };
    process::exit(code);
}

fn run(command: Commands) -> anyhow::Result<()> {
    let config = Config::load()?;

    match command {
        Commands::Install => commands::install::run(&config),
        Commands::Remove => commands::remove::run(&config),
        Commands::Status { json } => commands::status::run(&config, json).map(|_| ()),
        Commands::Update => commands::update::run(&config).map(|_| ()),
    }
}

fn report(err: &anyhow::Error) -> i32 {
    let code = error::exit_code(err);
    output::error(format!("{:#}", err));
    if code == EXIT_USAGE {
        let _ = Cli::command().print_help();
    }
    code
}
