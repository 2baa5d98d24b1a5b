//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a directory-wide commit never picks up a
/// half-written document. Parent directories are created as needed.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    tracing::trace!(path = %path, bytes = content.len(), "Wrote file");
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Create a directory and all of its parents.
pub fn ensure_dir(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    fs::create_dir_all(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Recursively copy the contents of `source` into `target`.
///
/// `target` is created if missing; existing files are overwritten. A `.git`
/// directory in `source` is skipped so copied trees never carry a foreign
/// history into a fixture repository.
pub fn copy_dir_all(source: &Path, target: &NormalizedPath) -> Result<()> {
    tracing::debug!(source = %source.display(), target = %target, "Copying directory");
    ensure_dir(target)?;

    let entries = fs::read_dir(source).map_err(|e| Error::io(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(source, e))?;
        let entry_path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == ".git" {
            tracing::debug!(source = %entry_path.display(), "Skipping nested git directory");
            continue;
        }

        let file_type = entry.file_type().map_err(|e| Error::io(&entry_path, e))?;
        let destination = target.join(&name);
        if file_type.is_dir() {
            copy_dir_all(&entry_path, &destination)?;
        } else {
            fs::copy(&entry_path, destination.to_native())
                .map_err(|e| Error::io(&entry_path, e))?;
        }
    }

    Ok(())
}
