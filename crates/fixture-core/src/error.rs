//! Error types for fixture-core

use std::path::PathBuf;

/// Result type for fixture-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a fixture
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path handed to the layout builder cannot address a deployment directory
    #[error("Invalid deployment path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A role directory could not be turned into a `file://` URL
    #[error("Cannot express {path} as a file URL")]
    InvalidFileUrl { path: PathBuf },

    /// A managed cluster did not report a usable context
    #[error("Cannot determine context of cluster '{name}': {reason}")]
    ClusterContext { name: String, reason: String },

    /// A credential path contains the platform's path-list separator
    #[error("Cannot build credential path list: {0}")]
    CredentialPaths(#[from] std::env::JoinPathsError),

    /// The external tool could not be started at all
    #[error("Failed to start {program}: {source}")]
    ToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool exited unsuccessfully; its output is attached
    #[error("{program} exited with code {code:?}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    ToolFailed {
        program: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from fixture-fs
    #[error(transparent)]
    Fs(#[from] fixture_fs::Error),

    /// Git error from fixture-git
    #[error(transparent)]
    Git(#[from] fixture_git::Error),
}
