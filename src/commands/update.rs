use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::error::FixError;
use crate::locator;
use crate::xpr::{self, Correction};

/// Run the update command - fix the project file in the current directory
pub fn run(config: &Config) -> Result<Correction> {
    run_in(Path::new("."), config)
}

/// Locate the project file in `dir` and fix its stored path
pub fn run_in(dir: &Path, config: &Config) -> Result<Correction> {
    let extension = &config.project.extension;
    let file = locator::find_descriptor(dir, extension)?.ok_or_else(|| FixError::Usage {
        dir: dir.to_path_buf(),
        extension: extension.trim_start_matches('.').to_string(),
    })?;

    fix_descriptor(&file)
}

/// Fix a project file that was located earlier. It may have disappeared since.
pub fn fix_descriptor(file: &Path) -> Result<Correction> {
    if !file.exists() {
        return Err(FixError::MissingFile(file.to_path_buf()).into());
    }
    xpr::correct_path(file)
}
