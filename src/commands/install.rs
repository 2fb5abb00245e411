use anyhow::Result;

use crate::config::Config;
use crate::hooks::HookManager;
use crate::output;

/// Run the install command - write the post-merge hook
pub fn run(config: &Config) -> Result<()> {
    let manager = HookManager::from_config(config);
    manager.install()?;

    output::info("Installed git hook successfully");

    let command = manager.command();
    match which::which(command) {
        Ok(found) => output::info(format!(
            "\"{}\" must be in the PATH variable (found {})",
            command,
            found.display()
        )),
        Err(_) => output::warn(format!(
            "\"{}\" must be in the PATH variable, but it was not found there. \
             Set hook.command in .xpr-fixer.toml to use a full path instead.",
            command
        )),
    }

    Ok(())
}
