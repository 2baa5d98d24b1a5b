//! Cluster and target registration.

use fixture_fs::{Document, FixtureFile};
use serde_yaml::{Mapping, Value};

use crate::cluster::ClusterProvider;
use crate::composer::ConfigComposer;
use crate::credentials::Credentials;
use crate::layout::plain_segment;
use crate::placement::{Role, RoleLayout};
use crate::Result;

const TARGETS: &str = "targets";
const NAME: &str = "name";

/// Writes cluster definitions and root-config targets.
///
/// Borrowed from a [`Fixture`](crate::Fixture) for the duration of a call chain.
pub struct Registrar<'a> {
    composer: &'a ConfigComposer,
    roles: &'a RoleLayout,
    credentials: &'a mut Credentials,
}

impl<'a> Registrar<'a> {
    pub fn new(
        composer: &'a ConfigComposer,
        roles: &'a RoleLayout,
        credentials: &'a mut Credentials,
    ) -> Self {
        Self {
            composer,
            roles,
            credentials,
        }
    }

    /// Write `clusters/<name>.yml` in the clusters role and commit it.
    ///
    /// `vars` are merged after `name` and `context` and win on conflicts.
    ///
    /// `name` must be a plain file name segment.
    pub fn register_cluster(&self, name: &str, context: &str, vars: &Mapping) -> Result<()> {
        plain_segment(name, "cluster name")?;
        let path = self
            .roles
            .dir(Role::Clusters)
            .join(FixtureFile::ClustersDir.as_str())
            .join(&format!("{name}.yml"));

        let cluster = cluster_definition(name, context, vars);
        self.composer
            .update(&path, Some(format!("add cluster {name}").as_str()), |_| cluster)?;

        tracing::debug!(cluster = name, context, "Registered cluster");
        Ok(())
    }

    /// Register a cluster run by `provider` and record its credential file.
    pub fn register_managed_cluster(
        &mut self,
        provider: &dyn ClusterProvider,
        vars: &Mapping,
    ) -> Result<()> {
        let context = provider.context()?;
        self.register_cluster(provider.name(), &context, vars)?;
        self.credentials.add(provider.kubeconfig())?;
        Ok(())
    }

    /// Append `{name, cluster, args}` to the root configuration's `targets`.
    pub fn register_target(&self, name: &str, cluster: &str, args: &Mapping) -> Result<()> {
        let mut target = Mapping::new();
        target.insert(NAME.into(), name.into());
        target.insert("cluster".into(), cluster.into());
        target.insert("args".into(), Value::Mapping(args.clone()));

        self.composer.update(
            &self.roles.root_config_path(),
            Some(format!("add target {name}").as_str()),
            |mut doc| {
                doc.update_list(&[TARGETS], |targets| targets.push(Value::Mapping(target)));
                doc
            },
        )?;
        Ok(())
    }

    /// Edit the target called `name`, creating `{name}` first if it is missing.
    pub fn update_target(
        &self,
        name: &str,
        update: impl FnOnce(Mapping) -> Mapping,
    ) -> Result<bool> {
        self.update_named_list_item(&[TARGETS], name, update)
    }

    /// Edit the entry of the root-config list at `list_path` whose `name` is
    /// `name`. A missing entry is appended as `{name}` before `update` runs.
    pub fn update_named_list_item(
        &self,
        list_path: &[&str],
        name: &str,
        update: impl FnOnce(Mapping) -> Mapping,
    ) -> Result<bool> {
        self.composer
            .update(&self.roles.root_config_path(), None, |doc| {
                with_named_item(doc, list_path, name, update)
            })
    }
}

/// The document stored for one cluster.
pub fn cluster_definition(name: &str, context: &str, vars: &Mapping) -> Document {
    let mut cluster = Mapping::new();
    cluster.insert(NAME.into(), name.into());
    cluster.insert("context".into(), context.into());
    for (key, value) in vars {
        cluster.insert(key.clone(), value.clone());
    }

    let mut doc = Document::new();
    doc.set(&["cluster"], Value::Mapping(cluster));
    doc
}

/// Upsert the `name`d mapping in the list at `list_path`.
///
/// Non-mapping entries and entries without a matching name are left alone.
pub fn with_named_item(
    mut doc: Document,
    list_path: &[&str],
    name: &str,
    update: impl FnOnce(Mapping) -> Mapping,
) -> Document {
    doc.update_list(list_path, |items| {
        let position = items
            .iter()
            .position(|item| item.get(NAME).and_then(Value::as_str) == Some(name));
        let index = match position {
            Some(index) => index,
            None => {
                let mut fresh = Mapping::new();
                fresh.insert(NAME.into(), name.into());
                items.push(Value::Mapping(fresh));
                items.len() - 1
            }
        };

        let current = match std::mem::replace(&mut items[index], Value::Null) {
            Value::Mapping(mapping) => mapping,
            _ => Mapping::new(),
        };
        items[index] = Value::Mapping(update(current));
    });
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target_names(doc: &Document) -> Vec<String> {
        doc.list_fields(&[TARGETS], NAME)
    }

    #[test]
    fn test_cluster_definition_vars_override() {
        let mut vars = Mapping::new();
        vars.insert("region".into(), "eu".into());
        vars.insert("context".into(), "override".into());

        let doc = cluster_definition("c1", "ctx1", &vars);
        assert_eq!(doc.get_str(&["cluster", "name"]), Some("c1"));
        assert_eq!(doc.get_str(&["cluster", "context"]), Some("override"));
        assert_eq!(doc.get_str(&["cluster", "region"]), Some("eu"));
    }

    #[test]
    fn test_with_named_item_creates_missing_entry() {
        let doc = with_named_item(Document::new(), &[TARGETS], "t1", |mut target| {
            target.insert("cluster".into(), "c1".into());
            target
        });

        assert_eq!(target_names(&doc), vec!["t1"]);
        assert_eq!(
            doc.list(&[TARGETS])[0].get("cluster").and_then(Value::as_str),
            Some("c1")
        );
    }

    #[test]
    fn test_with_named_item_edits_existing_in_place() {
        let doc = with_named_item(Document::new(), &[TARGETS], "t1", |t| t);
        let doc = with_named_item(doc, &[TARGETS], "t2", |t| t);
        let doc = with_named_item(doc, &[TARGETS], "t1", |mut target| {
            target.insert("cluster".into(), "c9".into());
            target
        });

        assert_eq!(target_names(&doc), vec!["t1", "t2"]);
        assert_eq!(
            doc.list(&[TARGETS])[0].get("cluster").and_then(Value::as_str),
            Some("c9")
        );
    }
}
