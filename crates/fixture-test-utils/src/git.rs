//! Git inspection helpers for fixture repositories.
//!
//! All helpers open the repository that owns the given directory (like
//! `git -C <dir>` would) and panic with a descriptive message on failure.

use std::fs;
use std::path::Path;

use git2::{Repository, StatusOptions};

fn open(dir: &Path) -> Repository {
    Repository::discover(dir)
        .unwrap_or_else(|e| panic!("no repository owns {}: {e}", dir.display()))
}

/// Initialises a plain repository with `git2` (no commit, no config).
///
/// Use for: a foreign repository the fixture must not commit into.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> Repository {
    Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Whether `dir` is itself the working directory of a repository.
pub fn is_repository_root(dir: &Path) -> bool {
    let Ok(repo) = Repository::open(dir) else {
        return false;
    };
    match (repo.workdir(), dir.canonicalize()) {
        (Some(workdir), Ok(dir)) => workdir.canonicalize().is_ok_and(|w| w == dir),
        _ => false,
    }
}

/// Commit messages from HEAD backwards along first parents, newest first.
pub fn commit_messages(dir: &Path) -> Vec<String> {
    let repo = open(dir);
    let mut commit = repo
        .head()
        .and_then(|head| head.peel_to_commit())
        .unwrap_or_else(|e| panic!("no HEAD commit in {}: {e}", dir.display()));

    let mut messages = vec![commit.message().unwrap_or_default().to_string()];
    while let Ok(parent) = commit.parent(0) {
        messages.push(parent.message().unwrap_or_default().to_string());
        commit = parent;
    }
    messages
}

/// Number of commits reachable from HEAD along first parents.
pub fn commit_count(dir: &Path) -> usize {
    commit_messages(dir).len()
}

/// Message of the HEAD commit.
pub fn head_message(dir: &Path) -> String {
    commit_messages(dir).remove(0)
}

/// Assert the owning repository has no staged, modified or untracked files.
///
/// # Panics
/// Panics listing the dirty paths.
pub fn assert_clean(dir: &Path) {
    let repo = open(dir);
    let mut opts = StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let statuses = repo
        .statuses(Some(&mut opts))
        .unwrap_or_else(|e| panic!("status failed in {}: {e}", dir.display()));

    let dirty: Vec<String> = statuses
        .iter()
        .filter_map(|entry| entry.path().map(str::to_string))
        .collect();
    assert!(
        dirty.is_empty(),
        "Expected a clean working tree in {}, dirty: {dirty:?}",
        dir.display()
    );
}

/// Assert the bytes of `file` on disk equal the bytes recorded for it at HEAD.
///
/// # Panics
/// Panics if the file is missing on disk, not tracked, or differs.
pub fn assert_committed(file: &Path) {
    let parent = file.parent().unwrap_or_else(|| panic!("{} has no parent", file.display()));
    let repo = open(parent);
    let workdir = repo
        .workdir()
        .and_then(|w| w.canonicalize().ok())
        .unwrap_or_else(|| panic!("bare repository owns {}", file.display()));
    let canonical = file
        .canonicalize()
        .unwrap_or_else(|e| panic!("cannot resolve {}: {e}", file.display()));
    let relative = canonical
        .strip_prefix(&workdir)
        .unwrap_or_else(|_| panic!("{} is outside {}", file.display(), workdir.display()));

    let tree = repo
        .head()
        .and_then(|head| head.peel_to_tree())
        .unwrap_or_else(|e| panic!("no HEAD tree for {}: {e}", file.display()));
    let entry = tree
        .get_path(relative)
        .unwrap_or_else(|e| panic!("{} not tracked at HEAD: {e}", relative.display()));
    let blob = repo
        .find_blob(entry.id())
        .unwrap_or_else(|e| panic!("{} is not a blob: {e}", relative.display()));

    let on_disk = fs::read(file).unwrap_or_else(|e| panic!("read {}: {e}", file.display()));
    assert!(
        blob.content() == on_disk.as_slice(),
        "{} differs from HEAD",
        file.display()
    );
}
