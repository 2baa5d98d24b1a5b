//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Fixture code compares, joins and relativizes paths as strings; converting to
/// platform-native form happens only at I/O and git boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes, strips trailing slashes (except
    /// for a bare root) and resolves `.` and `..` segments lexically.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Resolve symlinks and make the path absolute.
    ///
    /// Temporary directories are frequently reached through a symlink (`/var` vs
    /// `/private/var`), so workspace roots go through here once before any
    /// containment check compares against them.
    pub fn canonicalize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        dunce::canonicalize(path)
            .map(Self::new)
            .map_err(|e| Error::io(path, e))
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a (possibly multi-segment) relative path.
    ///
    /// Joining `"."` or an empty segment returns the path unchanged. `..`
    /// segments are resolved, so the result may lie outside `self`; callers that
    /// need containment check it with [`starts_with`](Self::starts_with).
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let segment_trimmed = segment_normalized.trim_matches('/');
        if segment_trimmed.is_empty() || segment_trimmed == "." {
            return self.clone();
        }
        if self.inner.is_empty() {
            return Self {
                inner: clean(segment_trimmed),
            };
        }
        Self {
            inner: clean(&format!("{}/{}", self.inner, segment_trimmed)),
        }
    }

    /// Whether any segment is `..`.
    ///
    /// Only relative paths can keep one after normalization.
    pub fn has_parent_segments(&self) -> bool {
        self.inner.split('/').any(|segment| segment == "..")
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) if trimmed.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Whether `base` is this path or one of its ancestors.
    ///
    /// Compares whole components, so `/tmp/ab` does not start with `/tmp/a`.
    pub fn starts_with(&self, base: &NormalizedPath) -> bool {
        self.relative_to(base).is_some()
    }

    /// The remainder of this path below `base`, or `None` if `base` is not an
    /// ancestor. Returns an empty string when both paths are equal.
    pub fn relative_to(&self, base: &NormalizedPath) -> Option<String> {
        if self.inner == base.inner {
            return Some(String::new());
        }
        let prefix = if base.inner.ends_with('/') {
            base.inner.clone()
        } else {
            format!("{}/", base.inner)
        };
        self.inner.strip_prefix(&prefix).map(str::to_string)
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

/// Collapse separators and resolve `.`/`..` without touching the filesystem.
///
/// `..` above an absolute root stays at the root; leading `..` of a relative
/// path is kept. A drive prefix such as `C:` is never popped.
fn clean(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let absolute = path.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." && !(segments.len() == 1 && last.ends_with(':')) => {
                    segments.pop();
                }
                Some(_) if segments.len() == 1 && !absolute && segments[0] != ".." => {}
                None if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    match (absolute, segments.is_empty()) {
        (true, _) => format!("/{}", segments.join("/")),
        (false, true) => ".".to_string(),
        (false, false) => segments.join("/"),
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
