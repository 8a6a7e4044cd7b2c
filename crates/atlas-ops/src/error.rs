//! Error types for the operations layer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors that can occur during operations.
///
/// Most pipeline conditions degrade instead of erroring (unreadable files
/// are skipped, parse failures yield empty import lists, missing git history
/// yields zero churn); only genuinely unrecoverable conditions surface here.
#[derive(Debug, Error)]
pub enum OpsError {
    /// An ignore pattern could not be compiled.
    #[error("Invalid ignore pattern from {path}: {message}")]
    IgnorePattern { path: PathBuf, message: String },
}
