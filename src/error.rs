use std::path::PathBuf;
use thiserror::Error;

pub const EXIT_SUCCESS: i32 = 0;
/// Parse errors, hook I/O errors and anything else unclassified
pub const EXIT_FATAL: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_UPDATE_FAILED: i32 = -1;

/// Failures that map to a specific exit code
#[derive(Debug, Error)]
pub enum FixError {
    #[error("no .{extension} file found in {}", .dir.display())]
    Usage { dir: PathBuf, extension: String },

    #[error("file or directory name \"{}\" does not exist", .0.display())]
    MissingFile(PathBuf),

    #[error("an error occurred while writing file {}\n{message}", .path.display())]
    Write { path: PathBuf, message: String },
}

impl FixError {
    pub fn exit_code(&self) -> i32 {
        match self {
            FixError::Usage { .. } => EXIT_USAGE,
            FixError::MissingFile(_) | FixError::Write { .. } => EXIT_UPDATE_FAILED,
        }
    }
}

/// Exit code for an error returned by any command
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<FixError>()
        .map(FixError::exit_code)
        .unwrap_or(EXIT_FATAL)
}
