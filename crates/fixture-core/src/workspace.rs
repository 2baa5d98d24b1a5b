//! Scoped fixture workspace
//!
//! [`Fixture::open`] lays out every role directory under a fresh temporary
//! root, gives each distinct directory its own repository and seeds the root
//! configuration and the top-level deployment descriptor. The whole tree is
//! removed by [`Fixture::close`] or, failing that, when the fixture is dropped.

use tempfile::TempDir;

use fixture_fs::{Document, FixtureFile, NormalizedPath, io};
use fixture_git::RepositoryManager;

use crate::Result;
use crate::composer::ConfigComposer;
use crate::credentials::Credentials;
use crate::invoker::ToolInvoker;
use crate::layout::DeploymentLayout;
use crate::options::FixtureOptions;
use crate::placement::{Role, RoleLayout, file_url};
use crate::registrar::Registrar;

const TEMP_PREFIX: &str = "deploy-fixture-";

/// A disposable multi-repository deployment project.
#[derive(Debug)]
pub struct Fixture {
    temp: TempDir,
    root: NormalizedPath,
    roles: RoleLayout,
    composer: ConfigComposer,
    options: FixtureOptions,
    credentials: Credentials,
}

impl Fixture {
    /// Create and seed a new fixture.
    pub fn open(options: FixtureOptions) -> Result<Self> {
        let temp = tempfile::Builder::new().prefix(TEMP_PREFIX).tempdir()?;
        let root = NormalizedPath::canonicalize(temp.path())?;
        let roles = RoleLayout::resolve(&root, &options.placement);
        let repos = RepositoryManager::new(root.clone(), options.committer.clone());

        io::ensure_dir(roles.project_dir())?;
        io::ensure_dir(
            &roles
                .dir(Role::Clusters)
                .join(FixtureFile::ClustersDir.as_str()),
        )?;
        io::ensure_dir(
            &roles
                .dir(Role::SealedSecrets)
                .join(FixtureFile::SealedSecretsDir.as_str()),
        )?;
        io::ensure_dir(roles.dir(Role::Deployment))?;

        for dir in roles.repository_dirs() {
            repos.initialize(dir)?;
        }

        let fixture = Self {
            temp,
            root,
            roles,
            composer: ConfigComposer::new(repos),
            options,
            credentials: Credentials::new(),
        };
        fixture.seed()?;

        tracing::info!(
            root = %fixture.root,
            placement = ?fixture.options.placement,
            "Opened deployment fixture"
        );
        Ok(fixture)
    }

    /// Remove the workspace tree.
    pub fn close(self) -> Result<()> {
        let root = self.root;
        self.temp.close()?;
        tracing::info!(root = %root, "Closed deployment fixture");
        Ok(())
    }

    fn seed(&self) -> Result<()> {
        let mut references = Vec::new();
        for role in Role::REFERENCED {
            if let Some(key) = role.config_key()
                && self.roles.is_independent(role)
            {
                references.push((key, file_url(self.roles.dir(role))?));
            }
        }

        self.update_root_config(None, |mut doc| {
            for (key, url) in references {
                doc.set(&[key, "project"], url);
            }
            doc
        })?;

        self.layout().update_descriptor("", |doc| doc)?;
        Ok(())
    }

    /// The workspace root every role directory lives under.
    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn roles(&self) -> &RoleLayout {
        &self.roles
    }

    /// The directory holding `role`'s files.
    pub fn dir(&self, role: Role) -> &NormalizedPath {
        self.roles.dir(role)
    }

    pub fn options(&self) -> &FixtureOptions {
        &self.options
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn composer(&self) -> &ConfigComposer {
        &self.composer
    }

    pub fn repos(&self) -> &RepositoryManager {
        self.composer.repos()
    }

    /// Current content of the root configuration.
    pub fn root_config(&self) -> Result<Document> {
        self.composer.load_or_empty(&self.roles.root_config_path())
    }

    /// Transform and commit the root configuration.
    pub fn update_root_config(
        &self,
        message: Option<&str>,
        transform: impl FnOnce(Document) -> Document,
    ) -> Result<bool> {
        self.composer
            .update(&self.roles.root_config_path(), message, transform)
    }

    /// Descriptor of the deployment directory `dir`, relative to the deployment root.
    pub fn deployment_descriptor(&self, dir: &str) -> Result<Document> {
        self.layout().descriptor(dir)
    }

    pub fn layout(&self) -> DeploymentLayout<'_> {
        DeploymentLayout::new(&self.composer, self.roles.dir(Role::Deployment))
    }

    pub fn registrar(&mut self) -> Registrar<'_> {
        Registrar::new(&self.composer, &self.roles, &mut self.credentials)
    }

    pub fn invoker(&self) -> ToolInvoker<'_> {
        ToolInvoker::new(&self.options, &self.roles, &self.credentials)
    }

    /// Add a variable to every later tool invocation's environment.
    pub fn add_extra_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.extra_env.insert(key.into(), value.into());
    }
}
