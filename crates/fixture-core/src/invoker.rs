//! External deployment tool invocation
//!
//! The invocation is assembled as a plain [`Invocation`] value first so its
//! shape (arguments, working directory, environment) can be inspected without
//! starting the tool.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use crate::credentials::{CREDENTIALS_ENV, Credentials};
use crate::options::FixtureOptions;
use crate::placement::{Role, RoleLayout, file_url};
use crate::{Error, Result};

/// A fully assembled tool command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    /// `None` when the project is passed by URL
    pub current_dir: Option<PathBuf>,
    /// Added on top of the inherited environment
    pub env: Vec<(String, OsString)>,
}

impl Invocation {
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }

    /// Arguments as lossy strings, for assertions and logs.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

/// Runs the deployment tool against a fixture.
#[derive(Debug, Clone, Copy)]
pub struct ToolInvoker<'a> {
    options: &'a FixtureOptions,
    roles: &'a RoleLayout,
    credentials: &'a Credentials,
}

impl<'a> ToolInvoker<'a> {
    pub fn new(
        options: &'a FixtureOptions,
        roles: &'a RoleLayout,
        credentials: &'a Credentials,
    ) -> Self {
        Self {
            options,
            roles,
            credentials,
        }
    }

    /// Assemble the command line for `args`.
    ///
    /// Order: the configured leading tool args, `args`, then `--project-url`
    /// when the root role is independent, then the local override flags.
    pub fn invocation(&self, args: &[&str]) -> Result<Invocation> {
        let tool = &self.options.tool;
        let mut argv: Vec<OsString> = tool.args.iter().map(OsString::from).collect();
        argv.extend(args.iter().map(OsString::from));

        let current_dir = if self.roles.is_independent(Role::Root) {
            argv.push("--project-url".into());
            argv.push(file_url(self.roles.project_dir())?.into());
            None
        } else {
            Some(self.roles.project_dir().to_native())
        };

        for (flag, path) in self.options.local_overrides.flags() {
            argv.push(flag.into());
            argv.push(path.clone().into_os_string());
        }

        let mut env: Vec<(String, OsString)> = self
            .options
            .extra_env
            .iter()
            .map(|(key, value)| (key.clone(), OsString::from(value)))
            .collect();
        env.push((CREDENTIALS_ENV.to_string(), self.credentials.joined()?));

        Ok(Invocation {
            program: tool.program.clone(),
            args: argv,
            current_dir,
            env,
        })
    }

    /// Run the tool synchronously and return its stdout.
    ///
    /// A non-zero exit becomes [`Error::ToolFailed`] carrying both output streams.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let invocation = self.invocation(args)?;
        tracing::info!(
            program = %invocation.program,
            args = ?invocation.args_lossy(),
            cwd = ?invocation.current_dir,
            "Running deployment tool"
        );

        let output = invocation
            .command()
            .output()
            .map_err(|source| Error::ToolSpawn {
                program: invocation.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            Ok(stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::debug!(code = ?output.status.code(), %stderr, "Deployment tool failed");
            Err(Error::ToolFailed {
                program: invocation.program,
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PlacementFlags;
    use fixture_fs::NormalizedPath;
    use pretty_assertions::assert_eq;

    fn roles(root_independent: bool) -> RoleLayout {
        RoleLayout::resolve(
            &NormalizedPath::new("/work"),
            &PlacementFlags {
                root: root_independent,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_embedded_root_runs_in_project_dir() {
        let options = FixtureOptions::new();
        let roles = roles(false);
        let credentials = Credentials::new();

        let invocation = ToolInvoker::new(&options, &roles, &credentials)
            .invocation(&["deploy", "-t", "t1"])
            .unwrap();

        assert_eq!(invocation.program, "kluctl");
        assert_eq!(invocation.args_lossy(), vec!["deploy", "-t", "t1"]);
        assert_eq!(
            invocation.current_dir,
            Some(PathBuf::from("/work/kluctl-project"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_independent_root_passes_project_url() {
        let options = FixtureOptions::new()
            .with_tool("sh", ["fake.sh"])
            .with_local_override(Role::Deployment, "/tmp/d");
        let roles = roles(true);
        let credentials = Credentials::new();

        let invocation = ToolInvoker::new(&options, &roles, &credentials)
            .invocation(&["render"])
            .unwrap();

        assert_eq!(invocation.program, "sh");
        assert_eq!(
            invocation.args_lossy(),
            vec![
                "fake.sh",
                "render",
                "--project-url",
                "file:///work/kluctl-project",
                "--local-deployment",
                "/tmp/d"
            ]
        );
        assert_eq!(invocation.current_dir, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_environment_carries_credentials_and_extra_env() {
        let options = FixtureOptions::new().with_env("KLUCTL_DEBUG", "1");
        let roles = roles(false);
        let mut credentials = Credentials::new();
        credentials.add(std::path::Path::new("/a/kubeconfig")).unwrap();
        credentials.add(std::path::Path::new("/b/kubeconfig")).unwrap();

        let invocation = ToolInvoker::new(&options, &roles, &credentials)
            .invocation(&[])
            .unwrap();

        assert_eq!(
            invocation.env,
            vec![
                ("KLUCTL_DEBUG".to_string(), OsString::from("1")),
                (
                    "KUBECONFIG".to_string(),
                    OsString::from("/a/kubeconfig:/b/kubeconfig")
                ),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let options =
            FixtureOptions::new().with_tool("definitely-not-a-real-tool-xyz", Vec::<String>::new());
        let roles = roles(true);
        let credentials = Credentials::new();

        let err = ToolInvoker::new(&options, &roles, &credentials)
            .run(&["version"])
            .unwrap_err();
        assert!(matches!(err, Error::ToolSpawn { .. }));
    }
}
