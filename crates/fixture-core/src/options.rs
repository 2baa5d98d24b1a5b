//! Fixture options
//!
//! Options decide the shape of a fixture before anything is written: which
//! roles get their own repository, which local override paths the tool is
//! pointed at, how the tool is started and who commits. They can be built in
//! code or loaded from a YAML, TOML or JSON file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use fixture_fs::{ConfigStore, NormalizedPath};
use fixture_git::Committer;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::placement::Role;

fn default_program() -> String {
    "kluctl".to_string()
}

/// Which roles are hosted in an independent directory and repository.
///
/// `false` means the role is embedded in the root project. For the root role
/// itself, `true` means the tool receives the project as a URL instead of
/// running inside its directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementFlags {
    pub root: bool,
    pub clusters: bool,
    pub deployment: bool,
    pub sealed_secrets: bool,
}

impl PlacementFlags {
    pub fn is_independent(&self, role: Role) -> bool {
        match role {
            Role::Root => self.root,
            Role::Clusters => self.clusters,
            Role::Deployment => self.deployment,
            Role::SealedSecrets => self.sealed_secrets,
        }
    }

    pub fn set(&mut self, role: Role, independent: bool) {
        match role {
            Role::Root => self.root = independent,
            Role::Clusters => self.clusters = independent,
            Role::Deployment => self.deployment = independent,
            Role::SealedSecrets => self.sealed_secrets = independent,
        }
    }
}

/// Local directories passed to the tool in place of a role's repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalOverrides {
    pub clusters: Option<PathBuf>,
    pub deployment: Option<PathBuf>,
    pub sealed_secrets: Option<PathBuf>,
}

impl LocalOverrides {
    /// Command-line flag and path for each configured override, in flag order.
    pub fn flags(&self) -> Vec<(&'static str, &PathBuf)> {
        [
            ("--local-clusters", &self.clusters),
            ("--local-deployment", &self.deployment),
            ("--local-sealed-secrets", &self.sealed_secrets),
        ]
        .into_iter()
        .filter_map(|(flag, path)| path.as_ref().map(|p| (flag, p)))
        .collect()
    }
}

/// How to start the deployment tool.
///
/// `args` are placed before the caller's positional arguments, which allows
/// wrapping the tool in an interpreter or script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ToolCommand {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
        }
    }
}

/// Everything that shapes a fixture at open time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureOptions {
    pub placement: PlacementFlags,
    pub local_overrides: LocalOverrides,
    pub tool: ToolCommand,
    pub committer: Committer,
    /// Extra environment for every tool invocation
    pub extra_env: BTreeMap<String, String>,
}

impl FixtureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a YAML, TOML or JSON file; missing keys take defaults.
    pub fn load(path: impl Into<NormalizedPath>) -> Result<Self> {
        Ok(ConfigStore::new().load(&path.into())?)
    }

    /// Host `role` in its own directory and repository.
    pub fn with_independent(mut self, role: Role) -> Self {
        self.placement.set(role, true);
        self
    }

    pub fn with_placement(mut self, placement: PlacementFlags) -> Self {
        self.placement = placement;
        self
    }

    /// Point the tool at a local directory for `role`. The root role has no
    /// override flag and is ignored.
    pub fn with_local_override(mut self, role: Role, path: impl Into<PathBuf>) -> Self {
        let path = Some(path.into());
        match role {
            Role::Root => {}
            Role::Clusters => self.local_overrides.clusters = path,
            Role::Deployment => self.local_overrides.deployment = path,
            Role::SealedSecrets => self.local_overrides.sealed_secrets = path,
        }
        self
    }

    pub fn with_tool<I, S>(mut self, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool = ToolCommand {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        };
        self
    }

    pub fn with_committer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.committer = Committer {
            name: name.into(),
            email: email.into(),
        };
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.insert(key.into(), value.into());
        self
    }
}
