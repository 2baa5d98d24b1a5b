//! Running the deployment tool against a fixture, using the fake tool script.
#![cfg(unix)]

use fixture_core::placement::file_url;
use fixture_core::{Error, Fixture, FixtureOptions, KubeconfigCluster, Role};
use fixture_test_utils::kubeconfig;
use fixture_test_utils::tool::{FAIL_CODE, FakeTool, Report};
use pretty_assertions::assert_eq;
use serde_yaml::Mapping;
use tempfile::TempDir;

fn options(tool: &FakeTool) -> FixtureOptions {
    FixtureOptions::new().with_tool(tool.program(), tool.args())
}

#[test]
fn test_embedded_root_runs_inside_project() {
    let tool = FakeTool::new();
    let fixture = Fixture::open(options(&tool)).unwrap();

    let report = Report::parse(&fixture.invoker().run(&["deploy", "-t", "t1"]).unwrap());

    assert!(report.ran_in(&fixture.roles().project_dir().to_native()));
    assert_eq!(report.args, vec!["deploy", "-t", "t1"]);
}

#[test]
fn test_independent_root_passes_project_url_and_overrides() {
    let tool = FakeTool::new();
    let overrides = TempDir::new().unwrap();
    let fixture = Fixture::open(
        options(&tool)
            .with_independent(Role::Root)
            .with_local_override(Role::Clusters, overrides.path().join("clusters"))
            .with_local_override(Role::SealedSecrets, overrides.path().join("secrets")),
    )
    .unwrap();

    let report = Report::parse(&fixture.invoker().run(&["render"]).unwrap());

    let project_url = file_url(fixture.roles().project_dir()).unwrap();
    assert_eq!(
        report.args,
        vec![
            "render".to_string(),
            "--project-url".to_string(),
            project_url,
            "--local-clusters".to_string(),
            overrides.path().join("clusters").to_string_lossy().into_owned(),
            "--local-sealed-secrets".to_string(),
            overrides.path().join("secrets").to_string_lossy().into_owned(),
        ]
    );
    assert!(!report.ran_in(&fixture.roles().project_dir().to_native()));
}

#[test]
fn test_environment_lists_credentials_and_extra_env() {
    let tool = FakeTool::new();
    let kind = TempDir::new().unwrap();
    let mut fixture = Fixture::open(options(&tool)).unwrap();
    let c1 = kubeconfig::write_kubeconfig(kind.path(), "c1", "kind-c1");
    let c2 = kubeconfig::write_kubeconfig(kind.path(), "c2", "kind-c2");

    {
        let mut registrar = fixture.registrar();
        registrar
            .register_managed_cluster(&KubeconfigCluster::new("c1", &c1), &Mapping::new())
            .unwrap();
        registrar
            .register_managed_cluster(&KubeconfigCluster::new("c2", &c2), &Mapping::new())
            .unwrap();
    }
    fixture.add_extra_env("FAKE_TOOL_EXTRA", "hello");

    let report = Report::parse(&fixture.invoker().run(&["diff"]).unwrap());

    assert_eq!(
        report.kubeconfig,
        format!("{}:{}", c1.display(), c2.display())
    );
    assert_eq!(report.extra, "hello");
}

#[test]
fn test_failure_carries_exit_code_and_output() {
    let tool = FakeTool::new();
    let fixture = Fixture::open(options(&tool).with_env("FAKE_TOOL_FAIL", "1")).unwrap();

    let err = fixture.invoker().run(&["deploy"]).unwrap_err();

    match err {
        Error::ToolFailed {
            code,
            stdout,
            stderr,
            ..
        } => {
            assert_eq!(code, Some(FAIL_CODE));
            assert_eq!(Report::parse(&stdout).args, vec!["deploy"]);
            assert!(stderr.contains("failing on request"));
        }
        other => panic!("expected ToolFailed, got {other:?}"),
    }
}
