//! Well-known file and directory names inside a fixture.

use std::path::Path;

/// Files and directories the deployment tool expects at fixed locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFile {
    /// Root project configuration (`.kluctl.yml`)
    RootConfig,
    /// Deployment descriptor, one per deployment directory
    DeploymentDescriptor,
    /// Generated resource-set descriptor inside a resource bundle
    ResourceSet,
    /// Placeholder committed when a repository is initialized
    Placeholder,
    /// Directory holding one definition file per cluster
    ClustersDir,
    /// Sealed secrets store directory
    SealedSecretsDir,
}

impl FixtureFile {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RootConfig => ".kluctl.yml",
            Self::DeploymentDescriptor => "deployment.yml",
            Self::ResourceSet => "kustomization.yml",
            Self::Placeholder => ".dummy",
            Self::ClustersDir => "clusters",
            Self::SealedSecretsDir => ".sealed-secrets",
        }
    }
}

impl AsRef<Path> for FixtureFile {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for FixtureFile {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for FixtureFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
