use anyhow::Result;

use crate::config::Config;
use crate::hooks::HookManager;
use crate::output;

/// Run the remove command - delete the post-merge hook if present
pub fn run(config: &Config) -> Result<()> {
    HookManager::from_config(config).remove()?;
    output::info("Removed git hook successfully");
    Ok(())
}
