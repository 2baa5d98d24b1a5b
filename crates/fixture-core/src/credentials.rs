//! Credential files accumulated from managed clusters.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::Result;

/// Environment variable the deployment tool reads credential files from.
pub const CREDENTIALS_ENV: &str = "KUBECONFIG";

/// Ordered, de-duplicated list of absolute credential-file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    paths: Vec<PathBuf>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` (made absolute) unless it is already present.
    ///
    /// Returns whether the list changed.
    pub fn add(&mut self, path: &Path) -> Result<bool> {
        let absolute = std::path::absolute(path)?;
        if self.paths.contains(&absolute) {
            return Ok(false);
        }
        self.paths.push(absolute);
        Ok(true)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths joined with the platform's path-list separator (`:` or `;`).
    pub fn joined(&self) -> Result<OsString> {
        Ok(std::env::join_paths(&self.paths)?)
    }
}
