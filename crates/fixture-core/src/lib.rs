//! Multi-repository deployment project fixtures
//!
//! A [`Fixture`] is a disposable workspace holding a deployment project split into
//! up to four roles (root, clusters, deployment, sealed secrets). Each role is
//! either embedded in the root project's repository or lives in its own
//! repository referenced by a `file://` URL. Every mutation is written and
//! committed before it returns, so the external deployment tool always sees a
//! consistent history.
//!
//! # Architecture
//!
//! ```text
//!                      Fixture
//!                         |
//!     +-----------+-------+--------+-----------+
//!     |           |                |           |
//! Registrar  DeploymentLayout  ToolInvoker  RoleLayout
//!     |           |
//!     +-----+-----+
//!           |
//!     ConfigComposer
//!           |
//!   fixture-git / fixture-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fixture_core::{Fixture, FixtureOptions, Role};
//!
//! fn example() -> fixture_core::Result<()> {
//!     let mut fixture = Fixture::open(FixtureOptions::new().with_independent(Role::Clusters))?;
//!     fixture.registrar().register_cluster("c1", "ctx1", &Default::default())?;
//!     fixture.registrar().register_target("t1", "c1", &Default::default())?;
//!     fixture
//!         .layout()
//!         .add_resource_bundle("apps/api", &[("deploy.yml", "kind: Deployment\n")])?;
//!     let stdout = fixture.invoker().run(&["deploy", "-t", "t1"])?;
//!     println!("{stdout}");
//!     fixture.close()
//! }
//! ```

pub mod cluster;
pub mod composer;
pub mod credentials;
pub mod error;
pub mod invoker;
pub mod layout;
pub mod logging;
pub mod options;
pub mod placement;
pub mod registrar;
pub mod workspace;

pub use cluster::{ClusterProvider, KubeconfigCluster};
pub use composer::ConfigComposer;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use invoker::{Invocation, ToolInvoker};
pub use layout::DeploymentLayout;
pub use options::{FixtureOptions, LocalOverrides, PlacementFlags, ToolCommand};
pub use placement::{Placement, Role, RoleLayout};
pub use registrar::Registrar;
pub use workspace::Fixture;

pub use fixture_fs::Document;
pub use fixture_git::Committer;
