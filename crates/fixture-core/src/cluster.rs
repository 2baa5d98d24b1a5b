//! Managed cluster providers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// An ephemeral test cluster the fixture can register.
///
/// The fixture only needs a name, the context to put into the cluster
/// definition and the credential file the tool must be given.
pub trait ClusterProvider {
    /// Cluster name; also the name of its definition file.
    fn name(&self) -> &str;

    /// Connection context selected by the credential file.
    fn context(&self) -> Result<String>;

    /// Credential (kubeconfig) file for this cluster.
    fn kubeconfig(&self) -> &Path;
}

/// A cluster described by an existing kubeconfig file.
///
/// The context is the file's `current-context`.
#[derive(Debug, Clone)]
pub struct KubeconfigCluster {
    name: String,
    kubeconfig: PathBuf,
}

impl KubeconfigCluster {
    pub fn new(name: impl Into<String>, kubeconfig: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kubeconfig: kubeconfig.into(),
        }
    }

    fn context_error(&self, reason: impl Into<String>) -> Error {
        Error::ClusterContext {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }
}

impl ClusterProvider for KubeconfigCluster {
    fn name(&self) -> &str {
        &self.name
    }

    fn context(&self) -> Result<String> {
        let content = fs::read_to_string(&self.kubeconfig).map_err(|e| {
            self.context_error(format!("reading {}: {e}", self.kubeconfig.display()))
        })?;
        let config: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| self.context_error(e.to_string()))?;

        config
            .get("current-context")
            .and_then(serde_yaml::Value::as_str)
            .filter(|context| !context.is_empty())
            .map(str::to_string)
            .ok_or_else(|| self.context_error("kubeconfig has no current-context"))
    }

    fn kubeconfig(&self) -> &Path {
        &self.kubeconfig
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_from_current_context() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kubeconfig");
        fs::write(&path, "apiVersion: v1\nkind: Config\ncurrent-context: kind-c1\n").unwrap();

        let cluster = KubeconfigCluster::new("c1", &path);
        assert_eq!(cluster.context().unwrap(), "kind-c1");
        assert_eq!(cluster.kubeconfig(), path.as_path());
    }

    #[test]
    fn test_missing_current_context_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kubeconfig");
        fs::write(&path, "apiVersion: v1\nkind: Config\n").unwrap();

        let err = KubeconfigCluster::new("c1", &path).context().unwrap_err();
        assert!(matches!(err, Error::ClusterContext { name, .. } if name == "c1"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = KubeconfigCluster::new("c1", "/nonexistent/kubeconfig")
            .context()
            .unwrap_err();
        assert!(matches!(err, Error::ClusterContext { .. }));
    }
}
