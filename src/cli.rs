use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xpr-fixer")]
#[command(author)]
#[command(version)]
#[command(arg_required_else_help = true)]
#[command(about = "Keeps the Path attribute of a Vivado .xpr project in sync with its location")]
#[command(long_about = "Vivado stores the absolute location of a project inside its .xpr file. \
After a checkout into a different directory that path is stale. xpr-fixer rewrites it to the \
file's real location, and can install itself as a git post-merge hook so this happens after \
every pull.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install as a git post-merge hook that runs "update" after "git pull"
    Install,

    /// Remove the git hook
    Remove,

    /// Report whether the git hook is installed
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Update the .xpr file in the current directory with its real path
    Update,
}
