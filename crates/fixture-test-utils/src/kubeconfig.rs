//! Minimal kubeconfig files for fake clusters.

use std::fs;
use std::path::{Path, PathBuf};

/// Write `<dir>/<name>.kubeconfig` selecting `context` and return its path.
///
/// The file is just enough for a context lookup; the server address is a
/// placeholder nothing connects to.
///
/// # Panics
/// Panics if the file cannot be written.
pub fn write_kubeconfig(dir: &Path, name: &str, context: &str) -> PathBuf {
    let content = format!(
        "apiVersion: v1
kind: Config
clusters:
  - name: {name}
    cluster:
      server: https://127.0.0.1:6443
contexts:
  - name: {context}
    context:
      cluster: {name}
      user: {name}
users:
  - name: {name}
    user: {{}}
current-context: {context}
"
    );

    let path = dir.join(format!("{name}.kubeconfig"));
    fs::write(&path, content)
        .unwrap_or_else(|e| panic!("write_kubeconfig: failed to write {}: {e}", path.display()));
    path
}
