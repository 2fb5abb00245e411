use anyhow::Result;

use crate::config::Config;
use crate::hooks::{HookManager, HookStatus};
use crate::output;

/// Run the status command
pub fn run(config: &Config, json_output: bool) -> Result<HookStatus> {
    let manager = HookManager::from_config(config);
    let status = manager.status();

    if json_output {
        let report = serde_json::json!({
            "installed": status.is_installed(),
            "status": status,
            "path": manager.path().display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if status.is_installed() {
        output::info(format!(
            "{} appears to be installed as a git hook ({})",
            manager.command(),
            manager.path().display()
        ));
    } else {
        output::info(format!("{} is not installed as a git hook", manager.command()));
    }

    Ok(status)
}
