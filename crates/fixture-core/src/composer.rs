//! Read-modify-write-commit over configuration documents.
//!
//! [`ConfigComposer::update`] is the only way fixture code writes a YAML
//! document. Higher-level operations (targets, clusters, descriptors) are pure
//! `Document -> Document` transforms handed to it.

use std::fs;

use fixture_fs::{ConfigStore, Document, NormalizedPath, io};
use fixture_git::RepositoryManager;

use crate::{Error, Result};

/// Applies document transforms and commits the result.
#[derive(Debug, Clone)]
pub struct ConfigComposer {
    repos: RepositoryManager,
    store: ConfigStore,
}

impl ConfigComposer {
    pub fn new(repos: RepositoryManager) -> Self {
        Self {
            repos,
            store: ConfigStore::new(),
        }
    }

    pub fn repos(&self) -> &RepositoryManager {
        &self.repos
    }

    /// Load `path`, apply `transform`, write the result and commit that single
    /// file into the repository owning its directory.
    ///
    /// A missing or unreadable document starts as empty. If the transformed
    /// document renders to exactly what is already on disk, nothing is written
    /// or committed. Returns whether a commit was made.
    ///
    /// `message` defaults to `update <path relative to the workspace root>`.
    pub fn update(
        &self,
        path: &NormalizedPath,
        message: Option<&str>,
        transform: impl FnOnce(Document) -> Document,
    ) -> Result<bool> {
        let current = self.load_or_empty(path)?;
        let updated = transform(current);
        let rendered = self.store.render(path, &updated)?;
        self.write_and_commit(path, rendered, message)
    }

    /// Text-level counterpart of [`update`](Self::update) for files that are not
    /// structured documents. A missing file starts as an empty string.
    pub fn update_file(
        &self,
        path: &NormalizedPath,
        message: Option<&str>,
        transform: impl FnOnce(String) -> String,
    ) -> Result<bool> {
        self.repos.ensure_inside(path)?;
        let current = io::read_text(path).unwrap_or_default();
        self.write_and_commit(path, transform(current), message)
    }

    /// Load a document, treating a missing or unreadable file as empty.
    pub fn load_or_empty(&self, path: &NormalizedPath) -> Result<Document> {
        self.repos.ensure_inside(path)?;
        Ok(self.store.load_document(path).unwrap_or_else(|e| {
            tracing::debug!(path = %path, error = %e, "Starting from empty document");
            Document::new()
        }))
    }

    fn write_and_commit(
        &self,
        path: &NormalizedPath,
        content: String,
        message: Option<&str>,
    ) -> Result<bool> {
        self.repos.ensure_inside(path)?;
        let (dir, file_name) = split_file_path(path)?;

        if fs::read_to_string(path.to_native()).is_ok_and(|existing| existing == content) {
            tracing::debug!(path = %path, "Document unchanged, skipping commit");
            return Ok(false);
        }

        io::write_text(path, &content)?;

        let message = match message {
            Some(message) => message.to_string(),
            None => format!("update {}", self.relative(path)),
        };
        self.repos
            .commit(&dir, Some(&[file_name]), false, &message)?;
        Ok(true)
    }

    fn relative(&self, path: &NormalizedPath) -> String {
        path.relative_to(self.repos.workspace_root())
            .unwrap_or_else(|| path.to_string())
    }
}

fn split_file_path(path: &NormalizedPath) -> Result<(NormalizedPath, &str)> {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => Ok((dir, name)),
        _ => Err(Error::InvalidPath {
            path: path.to_string(),
            reason: "not a file path".into(),
        }),
    }
}
