//! Commit history and committed-content inspection.

use chrono::{DateTime, TimeZone, Utc};
use fixture_fs::NormalizedPath;
use git2::{ErrorCode, Repository};
use std::path::Path;

use crate::Result;

/// Information about a single commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// Short commit hash (7 characters)
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    /// Commit author name
    pub author: String,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

/// The last `max_count` commits of the repository owning `dir`, newest first.
///
/// Walks first parents from `HEAD`; fixture histories are linear.
pub fn commit_history(dir: &NormalizedPath, max_count: usize) -> Result<Vec<CommitInfo>> {
    let repo = Repository::discover(dir.to_native())?;
    let head = repo.head()?.peel_to_commit()?;

    let mut revwalk = repo.revwalk()?;
    revwalk.push(head.id())?;
    revwalk.simplify_first_parent()?;

    let mut commits = Vec::with_capacity(max_count);

    for oid_result in revwalk.take(max_count) {
        let oid = oid_result?;
        let commit = repo.find_commit(oid)?;

        let timestamp = commit.time();
        let dt: DateTime<Utc> = Utc
            .timestamp_opt(timestamp.seconds(), 0)
            .single()
            .unwrap_or_default();

        let message = commit
            .message()
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .to_string();

        let author = commit.author();
        let author_name = author.name().unwrap_or("Unknown").to_string();

        commits.push(CommitInfo {
            hash: format!("{:.7}", oid),
            message,
            author: author_name,
            timestamp: dt,
        });
    }

    Ok(commits)
}

/// The content `HEAD` records for `path`, given relative to the root of the
/// repository owning `dir`. Returns `None` if the path is not in `HEAD`.
pub fn read_head_file(dir: &NormalizedPath, path: &str) -> Result<Option<Vec<u8>>> {
    let repo = Repository::discover(dir.to_native())?;
    let tree = repo.head()?.peel_to_tree()?;

    let entry = match tree.get_path(Path::new(path)) {
        Ok(entry) => entry,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let object = entry.to_object(&repo)?;
    Ok(object.as_blob().map(|blob| blob.content().to_vec()))
}
