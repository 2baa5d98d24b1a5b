//! Repository initialization and commits scoped to a fixture workspace.

use std::path::Path;

use fixture_fs::{FixtureFile, NormalizedPath, io};
use git2::{
    Commit, ErrorCode, IndexAddOption, IndexMatchedPath, Oid, Repository, RepositoryInitOptions,
    Signature,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const PLACEHOLDER_CONTENT: &str = "dummy";
const INITIAL_BRANCH: &str = "main";

fn default_name() -> String {
    "Fixture Builder".to_string()
}

fn default_email() -> String {
    "fixture@localhost".to_string()
}

/// Author and committer identity for every fixture commit.
///
/// Fixed so that commits never depend on the host's git configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_email")]
    pub email: String,
}

impl Default for Committer {
    fn default() -> Self {
        Self {
            name: default_name(),
            email: default_email(),
        }
    }
}

/// Initializes and commits into the repositories of one fixture workspace.
///
/// Every directory argument must lie inside the workspace root; anything else
/// is rejected with [`Error::OutsideWorkspace`] before git is touched.
#[derive(Debug, Clone)]
pub struct RepositoryManager {
    workspace_root: NormalizedPath,
    committer: Committer,
}

impl RepositoryManager {
    /// Create a manager for `workspace_root`.
    ///
    /// The root should already be canonical (see
    /// [`NormalizedPath::canonicalize`]) so containment checks compare like with
    /// like.
    pub fn new(workspace_root: NormalizedPath, committer: Committer) -> Self {
        Self {
            workspace_root,
            committer,
        }
    }

    pub fn workspace_root(&self) -> &NormalizedPath {
        &self.workspace_root
    }

    /// Create a repository rooted at `dir` with one commit holding a placeholder
    /// file, so the history is never empty.
    ///
    /// Must be called at most once per directory.
    pub fn initialize(&self, dir: &NormalizedPath) -> Result<Oid> {
        self.ensure_inside(dir)?;
        io::ensure_dir(dir)?;

        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(INITIAL_BRANCH);
        Repository::init_opts(dir.to_native(), &opts)?;

        io::write_text(&dir.join(FixtureFile::Placeholder.as_str()), PLACEHOLDER_CONTENT)?;

        tracing::debug!(dir = %dir, "Initialized fixture repository");
        self.commit(
            dir,
            Some(&[FixtureFile::Placeholder.as_str()]),
            false,
            "initial",
        )
    }

    /// Stage changes under `dir` and commit them into the repository owning it.
    ///
    /// `paths` are relative to `dir`; deleted paths are staged as removals. When
    /// `paths` is `None` or `whole_directory` is set, everything below `dir`
    /// (additions, modifications and deletions) is staged as well.
    ///
    /// Fails with [`Error::NothingToCommit`] if the staged tree equals `HEAD`.
    pub fn commit(
        &self,
        dir: &NormalizedPath,
        paths: Option<&[&str]>,
        whole_directory: bool,
        message: &str,
    ) -> Result<Oid> {
        self.ensure_inside(dir)?;

        let repo = self.open_owning(dir)?;
        let workdir = workdir_of(&repo, dir)?;
        let canonical_dir = NormalizedPath::canonicalize(dir)?;
        let prefix = canonical_dir
            .relative_to(&workdir)
            .ok_or_else(|| Error::NotARepository {
                path: dir.to_native(),
            })?;

        let mut index = repo.index()?;

        if let Some(paths) = paths {
            for path in paths {
                let relative = join_relative(&prefix, path);
                if workdir.join(&relative).exists() {
                    index.add_path(Path::new(&relative))?;
                } else {
                    index.remove_path(Path::new(&relative))?;
                }
            }
        }

        if whole_directory || paths.is_none() {
            // Directory names may contain glob characters, so select by literal prefix
            let below_dir: &mut IndexMatchedPath<'_> = &mut |path: &Path, _: &[u8]| {
                if is_within(&prefix, &path.to_string_lossy()) {
                    0
                } else {
                    1
                }
            };
            index.add_all(["*"], IndexAddOption::DEFAULT, Some(&mut *below_dir))?;
            index.update_all(["*"], Some(below_dir))?;
        }

        index.write()?;
        let tree_id = index.write_tree()?;

        let parent = head_commit(&repo)?;
        if let Some(parent) = &parent
            && parent.tree_id() == tree_id
        {
            return Err(Error::NothingToCommit {
                path: dir.to_native(),
            });
        }

        let tree = repo.find_tree(tree_id)?;
        let signature = Signature::now(&self.committer.name, &self.committer.email)?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        tracing::debug!(dir = %dir, commit = %oid, msg = message, "Committed fixture change");
        Ok(oid)
    }

    /// Whether `dir` is itself the root of a repository (not merely inside one).
    pub fn is_repository_root(&self, dir: &NormalizedPath) -> bool {
        Repository::open(dir.to_native()).is_ok_and(|repo| !repo.is_bare())
    }

    /// The working directory of the repository that owns `dir`.
    pub fn repository_root(&self, dir: &NormalizedPath) -> Result<NormalizedPath> {
        self.ensure_inside(dir)?;
        let repo = self.open_owning(dir)?;
        workdir_of(&repo, dir)
    }

    /// Whether anything below `dir` differs from what `HEAD` records for it,
    /// counting untracked files.
    pub fn has_changes(&self, dir: &NormalizedPath) -> Result<bool> {
        self.ensure_inside(dir)?;
        let repo = self.open_owning(dir)?;
        let workdir = workdir_of(&repo, dir)?;
        let prefix = NormalizedPath::canonicalize(dir)?
            .relative_to(&workdir)
            .unwrap_or_default();

        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .any(|entry| entry.path().is_some_and(|path| is_within(&prefix, path))))
    }

    /// Reject paths outside the workspace root.
    ///
    /// Paths are compared after `..` has been resolved, and a relative path
    /// that still climbs out is rejected too.
    pub fn ensure_inside(&self, dir: &NormalizedPath) -> Result<()> {
        if !dir.has_parent_segments() && dir.starts_with(&self.workspace_root) {
            Ok(())
        } else {
            Err(Error::OutsideWorkspace {
                path: dir.to_native(),
                workspace: self.workspace_root.to_native(),
            })
        }
    }

    fn open_owning(&self, dir: &NormalizedPath) -> Result<Repository> {
        let repo = Repository::discover(dir.to_native()).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::NotARepository {
                path: dir.to_native(),
            },
            _ => Error::Git(e),
        })?;

        // A repository above the workspace would silently absorb fixture commits
        let workdir = workdir_of(&repo, dir)?;
        if !workdir.starts_with(&NormalizedPath::canonicalize(&self.workspace_root)?) {
            return Err(Error::NotARepository {
                path: dir.to_native(),
            });
        }
        Ok(repo)
    }
}

fn workdir_of(repo: &Repository, dir: &NormalizedPath) -> Result<NormalizedPath> {
    let workdir = repo.workdir().ok_or_else(|| Error::NotARepository {
        path: dir.to_native(),
    })?;
    Ok(NormalizedPath::canonicalize(workdir)?)
}

fn head_commit(repo: &Repository) -> Result<Option<Commit<'_>>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Whether the workdir-relative `path` is `prefix` or lies below it.
fn is_within(prefix: &str, path: &str) -> bool {
    let path = path.replace('\\', "/");
    prefix.is_empty()
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn join_relative(prefix: &str, path: &str) -> String {
    let path = path.trim_start_matches("./");
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{prefix}/{path}")
    }
}
