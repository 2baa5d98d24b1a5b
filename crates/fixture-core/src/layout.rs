//! Deployment layout builder
//!
//! The deployment role is a tree of directories, each with a `deployment.yml`
//! descriptor. A descriptor lists child directories under `includes` and
//! resource bundles under `kustomizeDirs`:
//!
//! ```yaml
//! includes:
//!   - path: apps
//! kustomizeDirs:
//!   - path: namespaces
//! ```
//!
//! Inserting a bundle at `a/b/c` threads `includes` entries through every
//! ancestor (`.` includes `a`, `a` includes `b`) and lists `c` under
//! `kustomizeDirs` of `a/b`. Both steps are idempotent.

use std::path::Path;

use fixture_fs::document::entry;
use fixture_fs::{ConfigStore, Document, FixtureFile, NormalizedPath, io};

use crate::composer::ConfigComposer;
use crate::{Error, Result};

const INCLUDES: &str = "includes";
const KUSTOMIZE_DIRS: &str = "kustomizeDirs";
const PATH: &str = "path";

const RESOURCE_SET_API_VERSION: &str = "kustomize.config.k8s.io/v1beta1";
const RESOURCE_SET_KIND: &str = "Kustomization";

/// Builds the deployment descriptor tree rooted at the deployment role directory.
#[derive(Debug, Clone, Copy)]
pub struct DeploymentLayout<'a> {
    composer: &'a ConfigComposer,
    root: &'a NormalizedPath,
}

impl<'a> DeploymentLayout<'a> {
    pub fn new(composer: &'a ConfigComposer, root: &'a NormalizedPath) -> Self {
        Self { composer, root }
    }

    /// The deployment role directory.
    pub fn root(&self) -> &NormalizedPath {
        self.root
    }

    /// Absolute directory for a relative deployment path (`""` or `"."` is the root).
    pub fn dir(&self, path: &str) -> Result<NormalizedPath> {
        Ok(self.root.join(&path_components(path)?.join("/")))
    }

    /// Path of the descriptor belonging to `dir`.
    pub fn descriptor_path(&self, dir: &str) -> Result<NormalizedPath> {
        Ok(self
            .dir(dir)?
            .join(FixtureFile::DeploymentDescriptor.as_str()))
    }

    /// Apply `transform` to the descriptor of `dir` and commit it.
    pub fn update_descriptor(
        &self,
        dir: &str,
        transform: impl FnOnce(Document) -> Document,
    ) -> Result<bool> {
        let path = self.descriptor_path(dir)?;
        self.composer.update(&path, None, transform)
    }

    /// Read the descriptor of `dir`; a missing descriptor reads as empty.
    pub fn descriptor(&self, dir: &str) -> Result<Document> {
        let path = self.descriptor_path(dir)?;
        self.composer.load_or_empty(&path)
    }

    /// Write a resource bundle at `path` and link it into the tree.
    ///
    /// `resources` are (file name, literal content) pairs; the generated
    /// `kustomization.yml` lists the names in the given order. The bundle
    /// directory is committed as a whole, then includes are threaded from the
    /// deployment root down to the bundle's parent and the bundle is listed
    /// under the parent's `kustomizeDirs`.
    pub fn add_resource_bundle(&self, path: &str, resources: &[(&str, &str)]) -> Result<()> {
        let components = path_components(path)?;
        let Some((name, parents)) = components.split_last() else {
            return Err(Error::InvalidPath {
                path: path.to_string(),
                reason: "a resource bundle cannot be the deployment root".into(),
            });
        };

        for (file_name, _) in resources {
            plain_segment(file_name, "resource file name")?;
            if *file_name == FixtureFile::ResourceSet.as_str() {
                return Err(Error::InvalidPath {
                    path: file_name.to_string(),
                    reason: "reserved for the generated resource set".into(),
                });
            }
        }

        let bundle_dir = self.root.join(&components.join("/"));
        self.composer.repos().ensure_inside(&bundle_dir)?;
        for (file_name, content) in resources {
            io::write_text(&bundle_dir.join(file_name), content)?;
        }

        let names: Vec<&str> = resources.iter().map(|(name, _)| *name).collect();
        ConfigStore::new().save(
            &bundle_dir.join(FixtureFile::ResourceSet.as_str()),
            &resource_set(&names),
        )?;

        self.commit_bundle(&bundle_dir, &format!("add kustomize deployment {path}"))?;
        self.register_bundle(parents, name)
    }

    /// Copy an existing directory into the tree as bundle `target`.
    ///
    /// With `register` set the bundle is also linked like
    /// [`add_resource_bundle`](Self::add_resource_bundle) does.
    pub fn copy_resource_bundle(&self, source: &Path, target: &str, register: bool) -> Result<()> {
        let components = path_components(target)?;
        let Some((name, parents)) = components.split_last() else {
            return Err(Error::InvalidPath {
                path: target.to_string(),
                reason: "a resource bundle cannot be the deployment root".into(),
            });
        };

        let bundle_dir = self.root.join(&components.join("/"));
        self.composer.repos().ensure_inside(&bundle_dir)?;
        io::copy_dir_all(source, &bundle_dir)?;
        self.commit_bundle(
            &bundle_dir,
            &format!(
                "copy kustomize dir from {} to {target}",
                source.display()
            ),
        )?;

        if register {
            self.register_bundle(parents, name)?;
        }
        Ok(())
    }

    /// Copy a whole deployment tree into the deployment root and commit it.
    pub fn copy_deployment(&self, source: &Path) -> Result<()> {
        self.composer.repos().ensure_inside(self.root)?;
        io::copy_dir_all(source, self.root)?;
        self.commit_bundle(
            self.root,
            &format!("copy deployment from {}", source.display()),
        )
    }

    /// Unlist the bundle at `path` from its parent's `kustomizeDirs`.
    ///
    /// The bundle's files stay on disk and in history.
    pub fn delete_resource_bundle(&self, path: &str) -> Result<bool> {
        let components = path_components(path)?;
        let Some((name, parents)) = components.split_last() else {
            return Ok(false);
        };
        let parent = parents.join("/");
        self.update_descriptor(&parent, |doc| without_kustomize_dir(doc, name))
    }

    /// Ensure `dir`'s descriptor includes the child directory `include`.
    pub fn add_include(&self, dir: &str, include: &str) -> Result<bool> {
        self.update_descriptor(dir, |doc| with_include(doc, include))
    }

    /// Thread includes from the deployment root down to `dir`, one step per
    /// path component.
    pub fn add_includes(&self, dir: &str) -> Result<()> {
        let components = path_components(dir)?;
        self.thread_includes(&components)
    }

    /// Bundle paths reachable from `dir` by following includes, depth first.
    ///
    /// With `full_path` the returned paths are relative to the deployment root,
    /// otherwise they are the bare `kustomizeDirs` entries.
    pub fn list_bundle_paths(&self, dir: &str, full_path: bool) -> Result<Vec<String>> {
        let components = path_components(dir)?;
        let base = components.join("/");
        let descriptor = self.descriptor(&base)?;

        let mut paths = Vec::new();
        for bundle in descriptor.list_fields(&[KUSTOMIZE_DIRS], PATH) {
            paths.push(if full_path {
                join_relative(&base, &bundle)
            } else {
                bundle
            });
        }
        for include in descriptor.list_fields(&[INCLUDES], PATH) {
            paths.extend(self.list_bundle_paths(&join_relative(&base, &include), full_path)?);
        }
        Ok(paths)
    }

    fn thread_includes(&self, components: &[String]) -> Result<()> {
        for (depth, segment) in components.iter().enumerate() {
            let ancestor = components[..depth].join("/");
            self.add_include(&ancestor, segment)?;
        }
        Ok(())
    }

    fn register_bundle(&self, parents: &[String], name: &str) -> Result<()> {
        self.thread_includes(parents)?;
        self.update_descriptor(&parents.join("/"), |doc| with_kustomize_dir(doc, name))?;
        Ok(())
    }

    fn commit_bundle(&self, bundle_dir: &NormalizedPath, message: &str) -> Result<()> {
        let repos = self.composer.repos();
        if repos.has_changes(bundle_dir)? {
            repos.commit(bundle_dir, None, true, message)?;
        } else {
            tracing::debug!(dir = %bundle_dir, "Resource bundle unchanged, skipping commit");
        }
        Ok(())
    }
}

/// Check that `name` is one plain path segment: not empty, not `.` or `..`,
/// and free of separators.
pub fn plain_segment<'n>(name: &'n str, what: &str) -> Result<&'n str> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name == "." || name == ".." {
        "must not be `.` or `..`"
    } else if name.contains(['/', '\\']) {
        "must be a single path segment"
    } else {
        return Ok(name);
    };
    Err(Error::InvalidPath {
        path: name.to_string(),
        reason: format!("{what} {reason}"),
    })
}

/// Split a relative deployment path into its ordered components.
///
/// Both separators are accepted; empty and `.` components are dropped, so
/// `""`, `"."` and `"./"` all denote the deployment root. Absolute paths and
/// `..` components are rejected.
pub fn path_components(path: &str) -> Result<Vec<String>> {
    let normalized = path.replace('\\', "/");
    if normalized.starts_with('/') {
        return Err(Error::InvalidPath {
            path: path.to_string(),
            reason: "must be relative to the deployment root".into(),
        });
    }

    let mut components = Vec::new();
    for component in normalized.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                return Err(Error::InvalidPath {
                    path: path.to_string(),
                    reason: "parent segments are not allowed".into(),
                });
            }
            other => components.push(other.to_string()),
        }
    }
    Ok(components)
}

/// Append `{path: include}` to `includes` unless an entry already has that path.
pub fn with_include(doc: Document, include: &str) -> Document {
    with_unique_path_entry(doc, INCLUDES, include)
}

/// Append `{path: name}` to `kustomizeDirs` unless already listed.
pub fn with_kustomize_dir(doc: Document, name: &str) -> Document {
    with_unique_path_entry(doc, KUSTOMIZE_DIRS, name)
}

/// Drop every `kustomizeDirs` entry whose path is `name`.
pub fn without_kustomize_dir(mut doc: Document, name: &str) -> Document {
    if doc.get(&[KUSTOMIZE_DIRS]).is_some() {
        doc.update_list(&[KUSTOMIZE_DIRS], |dirs| {
            dirs.retain(|d| d.get(PATH).and_then(|p| p.as_str()) != Some(name))
        });
    }
    doc
}

/// The generated descriptor of a resource bundle.
pub fn resource_set(resources: &[&str]) -> Document {
    let mut doc = Document::new();
    doc.set(&["apiVersion"], RESOURCE_SET_API_VERSION);
    doc.set(&["kind"], RESOURCE_SET_KIND);
    doc.set(
        &["resources"],
        resources
            .iter()
            .map(|name| serde_yaml::Value::from(*name))
            .collect::<Vec<_>>(),
    );
    doc
}

fn with_unique_path_entry(mut doc: Document, list: &str, path: &str) -> Document {
    let existing = doc.list_fields(&[list], PATH);
    if !existing.iter().any(|p| p == path) {
        doc.update_list(&[list], |entries| entries.push(entry(PATH, path)));
    }
    doc
}

fn join_relative(base: &str, child: &str) -> String {
    if base.is_empty() {
        child.to_string()
    } else {
        format!("{base}/{child}")
    }
}
