//! End-to-end fixture scenarios
//!
//! These tests drive a complete fixture the way a deployment test suite would:
//! open, register clusters and targets, build the deployment tree, run the tool
//! (the fake tool script here) and close.
#![cfg(unix)]

use fixture_core::placement::file_url;
use fixture_core::{Fixture, FixtureOptions, KubeconfigCluster, Role};
use fixture_fs::NormalizedPath;
use fixture_git::{commit_history, read_head_file};
use fixture_test_utils::tool::{FakeTool, Report};
use fixture_test_utils::{git, kubeconfig, yaml};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_yaml::{Mapping, Value};
use tempfile::TempDir;

#[test]
fn test_deploy_scenario_with_all_roles_embedded() {
    let tool = FakeTool::new();
    let mut fixture =
        Fixture::open(FixtureOptions::new().with_tool(tool.program(), tool.args())).unwrap();
    let root = fixture.root().to_native();
    let project = fixture.roles().project_dir().clone();

    {
        let registrar = fixture.registrar();
        registrar.register_cluster("c1", "ctx1", &Mapping::new()).unwrap();
        registrar.register_target("t1", "c1", &Mapping::new()).unwrap();
    }
    fixture
        .layout()
        .add_resource_bundle("apps/api", &[("deploy.yml", "kind: Deployment\n")])
        .unwrap();

    // Every role resolves to the project directory, so nothing is referenced
    for role in Role::ALL {
        assert_eq!(fixture.dir(role), &project);
    }
    let config = yaml::load_yaml(&project.join(".kluctl.yml").to_native());
    for key in ["clusters", "deployment", "sealedSecrets"] {
        assert!(yaml::lookup(&config, &[key]).is_none(), "{key} is referenced");
    }
    assert_eq!(yaml::list_field(&config, &["targets"], "name"), vec!["t1"]);
    assert_eq!(yaml::list_field(&config, &["targets"], "cluster"), vec!["c1"]);

    let definition = read_head_file(&project, "clusters/c1.yml").unwrap().unwrap();
    let definition: Value = serde_yaml::from_slice(&definition).unwrap();
    assert_eq!(
        yaml::lookup(&definition, &["cluster", "name"]).and_then(Value::as_str),
        Some("c1")
    );
    assert_eq!(
        yaml::lookup(&definition, &["cluster", "context"]).and_then(Value::as_str),
        Some("ctx1")
    );

    let top = yaml::load_yaml(&project.join("deployment.yml").to_native());
    assert_eq!(yaml::list_field(&top, &["includes"], "path"), vec!["apps"]);
    let apps = yaml::load_yaml(&project.join("apps/deployment.yml").to_native());
    assert_eq!(yaml::list_field(&apps, &["kustomizeDirs"], "path"), vec!["api"]);
    let bundle = yaml::load_yaml(&project.join("apps/api/kustomization.yml").to_native());
    assert_eq!(yaml::string_list(&bundle, &["resources"]), vec!["deploy.yml"]);
    git::assert_committed(&project.join("apps/api/deploy.yml").to_native());
    git::assert_clean(&project.to_native());

    let report = Report::parse(&fixture.invoker().run(&["deploy", "-t", "t1"]).unwrap());
    assert!(report.ran_in(&project.to_native()));
    assert_eq!(report.args, vec!["deploy", "-t", "t1"]);
    assert_eq!(report.kubeconfig, "");

    fixture.close().unwrap();
    assert!(!root.exists());
}

#[test]
fn test_deploy_scenario_with_independent_clusters() {
    let _ = fixture_core::logging::init();
    let tool = FakeTool::new();
    let kind = TempDir::new().unwrap();
    let credentials = kubeconfig::write_kubeconfig(kind.path(), "c1", "ctx1");

    let mut fixture = Fixture::open(
        FixtureOptions::new()
            .with_independent(Role::Clusters)
            .with_tool(tool.program(), tool.args()),
    )
    .unwrap();
    let root = fixture.root().to_native();

    {
        let mut registrar = fixture.registrar();
        registrar
            .register_managed_cluster(&KubeconfigCluster::new("c1", &credentials), &Mapping::new())
            .unwrap();
        registrar.register_target("t1", "c1", &Mapping::new()).unwrap();
    }
    fixture
        .layout()
        .add_resource_bundle("apps/api", &[("deploy.yml", "kind: Deployment\n")])
        .unwrap();

    let project = fixture.roles().project_dir().clone();
    let clusters = fixture.dir(Role::Clusters).clone();

    // Root configuration references the clusters repository and lists the target
    let config = yaml::load_yaml(&project.join(".kluctl.yml").to_native());
    assert_eq!(
        yaml::lookup(&config, &["clusters", "project"]).and_then(Value::as_str),
        Some(file_url(&clusters).unwrap().as_str())
    );
    assert!(yaml::lookup(&config, &["deployment"]).is_none());
    assert_eq!(yaml::list_field(&config, &["targets"], "name"), vec!["t1"]);
    assert_eq!(yaml::list_field(&config, &["targets"], "cluster"), vec!["c1"]);

    // Cluster definition lives in the independent repository
    let definition = read_head_file(&clusters, "clusters/c1.yml").unwrap().unwrap();
    let definition: Value = serde_yaml::from_slice(&definition).unwrap();
    assert_eq!(
        yaml::lookup(&definition, &["cluster", "context"]).and_then(Value::as_str),
        Some("ctx1")
    );
    let history: Vec<String> = commit_history(&clusters, 10)
        .unwrap()
        .into_iter()
        .map(|c| c.message)
        .collect();
    assert_eq!(history, vec!["add cluster c1", "initial"]);
    assert!(
        commit_history(&clusters, 1)
            .unwrap()
            .iter()
            .all(|c| c.author == "Fixture Builder")
    );

    // Deployment tree is embedded in the root project
    let top = yaml::load_yaml(&project.join("deployment.yml").to_native());
    assert_eq!(yaml::list_field(&top, &["includes"], "path"), vec!["apps"]);
    let apps = yaml::load_yaml(&project.join("apps/deployment.yml").to_native());
    assert_eq!(yaml::list_field(&apps, &["kustomizeDirs"], "path"), vec!["api"]);
    let bundle = yaml::load_yaml(&project.join("apps/api/kustomization.yml").to_native());
    assert_eq!(yaml::string_list(&bundle, &["resources"]), vec!["deploy.yml"]);
    git::assert_clean(&project.to_native());
    git::assert_clean(&clusters.to_native());

    // The tool sees the project, the arguments and the credential list
    let report = Report::parse(&fixture.invoker().run(&["deploy", "-t", "t1"]).unwrap());
    assert!(report.ran_in(&project.to_native()));
    assert_eq!(report.args, vec!["deploy", "-t", "t1"]);
    assert_eq!(report.kubeconfig, credentials.to_string_lossy());

    fixture.close().unwrap();
    assert!(!root.exists());
}

#[rstest]
#[case::embedded(false)]
#[case::independent(true)]
fn test_deployment_role_placement_in_scenario(#[case] independent: bool) {
    let mut options = FixtureOptions::new();
    if independent {
        options = options.with_independent(Role::Deployment);
    }
    let fixture = Fixture::open(options).unwrap();

    fixture
        .layout()
        .add_resource_bundle("infra/namespaces", &[("ns.yml", "kind: Namespace\n")])
        .unwrap();
    fixture
        .layout()
        .add_resource_bundle("infra/crds", &[("crd.yml", "kind: CustomResourceDefinition\n")])
        .unwrap();

    let deployment = fixture.dir(Role::Deployment);
    let expected_dir = if independent {
        fixture.root().join("external-deployment")
    } else {
        fixture.roles().project_dir().clone()
    };
    assert_eq!(deployment, &expected_dir);
    assert_eq!(
        fixture.layout().list_bundle_paths(".", true).unwrap(),
        vec!["infra/namespaces", "infra/crds"]
    );

    let config = fixture.root_config().unwrap();
    let reference = config.get_str(&["deployment", "project"]).map(str::to_string);
    assert_eq!(reference.is_some(), independent);

    let messages = git::commit_messages(&deployment.to_native());
    assert!(messages.contains(&"add kustomize deployment infra/crds".to_string()));
}

#[test]
fn test_fixtures_are_isolated_from_each_other() {
    let first = Fixture::open(FixtureOptions::new()).unwrap();
    let second = Fixture::open(FixtureOptions::new()).unwrap();

    assert_ne!(first.root(), second.root());
    assert!(!first.root().starts_with(second.root()));

    first
        .layout()
        .add_resource_bundle("only/first", &[("a.yml", "kind: A\n")])
        .unwrap();

    assert!(
        second
            .layout()
            .list_bundle_paths("", true)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_composer_rejects_paths_outside_the_workspace() {
    let fixture = Fixture::open(FixtureOptions::new()).unwrap();
    let elsewhere = TempDir::new().unwrap();
    let outside = NormalizedPath::new(elsewhere.path()).join("config.yml");

    let err = fixture.composer().update(&outside, None, |doc| doc).unwrap_err();

    assert!(matches!(
        err,
        fixture_core::Error::Git(fixture_git::Error::OutsideWorkspace { .. })
    ));
    assert!(!outside.exists());
}
