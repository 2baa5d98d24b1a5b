//! Filesystem abstraction for deployment project fixtures
//!
//! Provides normalized paths, atomic writes, format-agnostic config loading and
//! the untyped [`Document`] used for every YAML file a fixture owns.

pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::FixtureFile;
pub use document::Document;
pub use error::{Error, Result};
pub use path::NormalizedPath;
