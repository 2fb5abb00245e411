use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Find the first descriptor with the given extension directly inside `dir`.
///
/// Entries are taken in directory-listing order and are not sorted, so with
/// several descriptors present the one returned depends on the filesystem.
pub fn find_descriptor(dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));

    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if entry.file_name().to_string_lossy().ends_with(&suffix) {
            return Ok(Some(dir.join(entry.file_name())));
        }
    }

    Ok(None)
}
