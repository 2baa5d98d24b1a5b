//! A scripted stand-in for the deployment tool.
//!
//! The script reports what it was started with on stdout, one `key=value`
//! line each, so tests can assert on the invocation a fixture produced:
//!
//! ```text
//! cwd=/tmp/deploy-fixture-x/kluctl-project
//! arg=deploy
//! arg=-t
//! arg=t1
//! kubeconfig=/tmp/kind/c1.kubeconfig
//! extra=
//! ```
//!
//! Setting `FAKE_TOOL_FAIL` in the environment makes it exit with code 3
//! after printing.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Exit code of the script when `FAKE_TOOL_FAIL` is set.
pub const FAIL_CODE: i32 = 3;

const SCRIPT: &str = r#"#!/bin/sh
echo "cwd=$(pwd -P)"
for arg in "$@"; do
  echo "arg=$arg"
done
echo "kubeconfig=${KUBECONFIG}"
echo "extra=${FAKE_TOOL_EXTRA}"
if [ -n "$FAKE_TOOL_FAIL" ]; then
  echo "failing on request" >&2
  exit 3
fi
"#;

/// The fake tool script in its own temporary directory.
pub struct FakeTool {
    dir: TempDir,
}

impl Default for FakeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTool {
    /// Write the script into a fresh temporary directory.
    ///
    /// # Panics
    /// Panics if the directory or script cannot be created.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("FakeTool: no temp dir: {e}"));
        fs::write(dir.path().join("fake-tool.sh"), SCRIPT)
            .unwrap_or_else(|e| panic!("FakeTool: failed to write script: {e}"));
        Self { dir }
    }

    pub fn script(&self) -> PathBuf {
        self.dir.path().join("fake-tool.sh")
    }

    /// Program to start; the script is passed as its first argument.
    pub fn program(&self) -> &'static str {
        "sh"
    }

    /// Leading arguments placed before the caller's.
    pub fn args(&self) -> Vec<String> {
        vec![self.script().to_string_lossy().into_owned()]
    }
}

/// What the fake tool reported about its own invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub cwd: PathBuf,
    pub args: Vec<String>,
    pub kubeconfig: String,
    pub extra: String,
}

impl Report {
    /// Parse the script's stdout.
    pub fn parse(stdout: &str) -> Self {
        let mut report = Self::default();
        for line in stdout.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key {
                "cwd" => report.cwd = PathBuf::from(value),
                "arg" => report.args.push(value.to_string()),
                "kubeconfig" => report.kubeconfig = value.to_string(),
                "extra" => report.extra = value.to_string(),
                _ => {}
            }
        }
        report
    }

    /// Whether the tool ran in `dir` (compared after resolving symlinks).
    pub fn ran_in(&self, dir: &Path) -> bool {
        match (self.cwd.canonicalize(), dir.canonicalize()) {
            (Ok(cwd), Ok(dir)) => cwd == dir,
            _ => false,
        }
    }
}
