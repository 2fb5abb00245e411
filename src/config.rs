use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Name of the optional per-project configuration file
pub const CONFIG_FILE: &str = ".xpr-fixer.toml";

/// Product name written into the hook script and the banner
pub const PRODUCT: &str = "Vivado XPR Path Fixer";

/// Author written into the hook script and the banner
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// xpr-fixer configuration loaded from environment and .xpr-fixer.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub hook: HookConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Descriptor file extension, without the leading dot
    pub extension: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    pub path: PathBuf,
    /// Program invoked by the hook script
    pub command: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            extension: "xpr".to_string(),
        }
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".git/hooks/post-merge"),
            command: program_name(),
        }
    }
}

impl Config {
    /// Load configuration from .xpr-fixer.toml and environment variables.
    /// Environment variables take precedence over config file values.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("XPR_FIXER_EXTENSION") {
            self.project.extension = val;
        }
        if let Ok(val) = env::var("XPR_FIXER_HOOK_PATH") {
            self.hook.path = PathBuf::from(val);
        }
        if let Ok(val) = env::var("XPR_FIXER_HOOK_COMMAND") {
            self.hook.command = val;
        }
    }
}

/// Basename of the running program, as the shell would invoke it
pub fn program_name() -> String {
    env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
