//! Git plumbing for deployment project fixtures
//!
//! Every role directory of a fixture is either its own repository or lives
//! inside the root project's repository. [`RepositoryManager`] initializes those
//! repositories and commits into whichever one owns a given directory.

pub mod commits;
pub mod error;
pub mod repository;

pub use commits::{CommitInfo, commit_history, read_head_file};
pub use error::{Error, Result};
pub use repository::{Committer, RepositoryManager};
