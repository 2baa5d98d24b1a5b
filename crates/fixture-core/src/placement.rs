//! Role placement
//!
//! Each role resolves once, at open time, to either the root project directory
//! ([`Placement::Embedded`]) or a sibling directory with its own repository
//! ([`Placement::Independent`]). Everything else asks [`RoleLayout`] instead of
//! re-deriving directories from flags.

use fixture_fs::{FixtureFile, NormalizedPath};
use url::Url;

use crate::options::PlacementFlags;
use crate::{Error, Result};

const PROJECT_DIR: &str = "kluctl-project";

/// A logical sub-project of a deployment project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Root,
    Clusters,
    Deployment,
    SealedSecrets,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Root,
        Role::Clusters,
        Role::Deployment,
        Role::SealedSecrets,
    ];

    /// Roles the root configuration can reference by URL.
    pub const REFERENCED: [Role; 3] = [Role::Clusters, Role::Deployment, Role::SealedSecrets];

    /// Directory name under the workspace root when the role is independent.
    pub fn independent_dir_name(&self) -> &'static str {
        match self {
            Self::Root => PROJECT_DIR,
            Self::Clusters => "external-clusters",
            Self::Deployment => "external-deployment",
            Self::SealedSecrets => "external-sealed-secrets",
        }
    }

    /// Key of the `<key>.project` reference in the root configuration.
    pub fn config_key(&self) -> Option<&'static str> {
        match self {
            Self::Root => None,
            Self::Clusters => Some("clusters"),
            Self::Deployment => Some("deployment"),
            Self::SealedSecrets => Some("sealedSecrets"),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::Clusters => "clusters",
            Self::Deployment => "deployment",
            Self::SealedSecrets => "sealed-secrets",
        };
        f.write_str(name)
    }
}

/// Where a role's files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Inside the root project directory and its history
    Embedded,
    /// In its own directory with its own history
    Independent(NormalizedPath),
}

impl Placement {
    pub fn is_independent(&self) -> bool {
        matches!(self, Self::Independent(_))
    }
}

/// Resolved directories of all four roles.
#[derive(Debug, Clone)]
pub struct RoleLayout {
    project_dir: NormalizedPath,
    root: Placement,
    clusters: Placement,
    deployment: Placement,
    sealed_secrets: Placement,
}

impl RoleLayout {
    /// Resolve every role under `workspace_root`.
    pub fn resolve(workspace_root: &NormalizedPath, flags: &PlacementFlags) -> Self {
        let project_dir = workspace_root.join(PROJECT_DIR);
        let place = |role: Role| {
            if flags.is_independent(role) {
                Placement::Independent(workspace_root.join(role.independent_dir_name()))
            } else {
                Placement::Embedded
            }
        };

        Self {
            root: place(Role::Root),
            clusters: place(Role::Clusters),
            deployment: place(Role::Deployment),
            sealed_secrets: place(Role::SealedSecrets),
            project_dir,
        }
    }

    pub fn placement(&self, role: Role) -> &Placement {
        match role {
            Role::Root => &self.root,
            Role::Clusters => &self.clusters,
            Role::Deployment => &self.deployment,
            Role::SealedSecrets => &self.sealed_secrets,
        }
    }

    pub fn is_independent(&self, role: Role) -> bool {
        self.placement(role).is_independent()
    }

    /// The root project directory; always a repository root.
    pub fn project_dir(&self) -> &NormalizedPath {
        &self.project_dir
    }

    /// The directory holding `role`'s files.
    pub fn dir(&self, role: Role) -> &NormalizedPath {
        match self.placement(role) {
            Placement::Independent(dir) => dir,
            Placement::Embedded => &self.project_dir,
        }
    }

    /// The root configuration file of the project.
    pub fn root_config_path(&self) -> NormalizedPath {
        self.dir(Role::Root).join(FixtureFile::RootConfig.as_str())
    }

    /// Every distinct directory that needs its own repository, root first.
    pub fn repository_dirs(&self) -> Vec<&NormalizedPath> {
        let mut dirs: Vec<&NormalizedPath> = Vec::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            let dir = self.dir(role);
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }
}

/// `file://` URL for a local directory.
pub fn file_url(dir: &NormalizedPath) -> Result<String> {
    Url::from_file_path(dir.to_native())
        .map(String::from)
        .map_err(|()| Error::InvalidFileUrl {
            path: dir.to_native(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_embedded_share_project_dir() {
        let root = NormalizedPath::new("/work");
        let layout = RoleLayout::resolve(&root, &PlacementFlags::default());

        for role in Role::ALL {
            assert_eq!(layout.dir(role).as_str(), "/work/kluctl-project");
        }
        assert_eq!(layout.repository_dirs().len(), 1);
    }

    #[test]
    fn test_independent_roles_get_siblings() {
        let root = NormalizedPath::new("/work");
        let flags = PlacementFlags {
            clusters: true,
            sealed_secrets: true,
            ..Default::default()
        };
        let layout = RoleLayout::resolve(&root, &flags);

        assert_eq!(layout.dir(Role::Clusters).as_str(), "/work/external-clusters");
        assert_eq!(layout.dir(Role::Deployment).as_str(), "/work/kluctl-project");
        assert_eq!(
            layout.dir(Role::SealedSecrets).as_str(),
            "/work/external-sealed-secrets"
        );
        let dirs: Vec<_> = layout.repository_dirs().iter().map(|d| d.as_str()).collect();
        assert_eq!(
            dirs,
            vec![
                "/work/kluctl-project",
                "/work/external-clusters",
                "/work/external-sealed-secrets"
            ]
        );
    }

    #[test]
    fn test_independent_root_keeps_project_dir() {
        let root = NormalizedPath::new("/work");
        let flags = PlacementFlags {
            root: true,
            ..Default::default()
        };
        let layout = RoleLayout::resolve(&root, &flags);

        assert!(layout.is_independent(Role::Root));
        assert_eq!(layout.dir(Role::Root), layout.project_dir());
        assert_eq!(layout.repository_dirs().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_url() {
        let url = file_url(&NormalizedPath::new("/work/external-clusters")).unwrap();
        assert_eq!(url, "file:///work/external-clusters");
    }
}
