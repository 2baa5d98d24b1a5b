//! Fixture options loaded from files.

use std::fs;

use fixture_core::{Fixture, FixtureOptions, Role};
use fixture_fs::NormalizedPath;
use fixture_test_utils::git;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_yaml_options_shape_the_fixture() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fixture.yml");
    fs::write(
        &path,
        "placement:
  clusters: true
  sealed_secrets: true
committer:
  name: CI Bot
  email: ci@example.com
extra_env:
  KLUCTL_NO_UPDATE_CHECK: \"true\"
",
    )
    .unwrap();

    let options = FixtureOptions::load(NormalizedPath::new(&path)).unwrap();
    assert_eq!(options.tool.program, "kluctl");
    assert_eq!(
        options.extra_env.get("KLUCTL_NO_UPDATE_CHECK").map(String::as_str),
        Some("true")
    );

    let fixture = Fixture::open(options).unwrap();
    assert!(fixture.roles().is_independent(Role::Clusters));
    assert!(fixture.roles().is_independent(Role::SealedSecrets));
    assert!(!fixture.roles().is_independent(Role::Deployment));

    let clusters = fixture.dir(Role::Clusters).to_native();
    let history = fixture_git::commit_history(fixture.dir(Role::Clusters), 1).unwrap();
    assert_eq!(history[0].author, "CI Bot");
    assert_eq!(git::commit_count(&clusters), 1);
}

#[test]
fn test_toml_options_with_tool_and_overrides() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fixture.toml");
    fs::write(
        &path,
        r#"
[placement]
root = true

[tool]
program = "sh"
args = ["wrapper.sh"]

[local_overrides]
deployment = "/tmp/local-deployment"
"#,
    )
    .unwrap();

    let options = FixtureOptions::load(NormalizedPath::new(&path)).unwrap();
    assert!(options.placement.root);
    assert_eq!(options.tool.args, vec!["wrapper.sh"]);

    let fixture = Fixture::open(options).unwrap();
    let invocation = fixture.invoker().invocation(&["render"]).unwrap();
    let args = invocation.args_lossy();
    assert_eq!(args[0], "wrapper.sh");
    assert_eq!(args[1], "render");
    assert_eq!(args[2], "--project-url");
    assert_eq!(&args[4..], ["--local-deployment", "/tmp/local-deployment"]);
    assert_eq!(invocation.current_dir, None);
}

#[test]
fn test_unknown_option_format_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fixture.ini");
    fs::write(&path, "placement=none\n").unwrap();

    assert!(FixtureOptions::load(NormalizedPath::new(&path)).is_err());
}
