use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, AUTHOR, PRODUCT};
use crate::templates;

/// Whether the post-merge hook is present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStatus {
    Installed,
    NotInstalled,
}

impl HookStatus {
    pub fn is_installed(&self) -> bool {
        matches!(self, HookStatus::Installed)
    }
}

impl std::fmt::Display for HookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookStatus::Installed => write!(f, "installed"),
            HookStatus::NotInstalled => write!(f, "not installed"),
        }
    }
}

/// Owns the git hook script: where it lives and what it runs
#[derive(Debug, Clone)]
pub struct HookManager {
    path: PathBuf,
    command: String,
    product: String,
    author: String,
}

impl HookManager {
    pub fn new(path: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            command: command.into(),
            product: PRODUCT.to_string(),
            author: AUTHOR.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.hook.path, &config.hook.command)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn script(&self) -> String {
        templates::render_hook(&self.product, &self.author, &self.command)
    }

    /// Write the hook script, replacing any existing one
    pub fn install(&self) -> Result<()> {
        fs::write(&self.path, self.script()).with_context(|| {
            format!(
                "Failed to write {} (is this the root of a git repository?)",
                self.path.display()
            )
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&self.path, perms)
                .with_context(|| format!("Failed to make {} executable", self.path.display()))?;
        }

        Ok(())
    }

    /// Delete the hook script. Succeeds when it was never installed.
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    pub fn status(&self) -> HookStatus {
        if self.path.is_file() {
            HookStatus::Installed
        } else {
            HookStatus::NotInstalled
        }
    }
}
