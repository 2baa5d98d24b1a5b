//! Error types for fixture-git

use std::path::PathBuf;

/// Result type for fixture-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fixture-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] fixture_fs::Error),

    #[error("Refusing to operate on {path}: outside of workspace {workspace}")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("Nothing to commit in {path}")]
    NothingToCommit { path: PathBuf },

    #[error("No repository inside the workspace owns {path}")]
    NotARepository { path: PathBuf },
}
