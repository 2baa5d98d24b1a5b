//! Shared test utilities for the deploy-fixture workspace.
//!
//! This crate provides reusable helpers so crate test suites do not duplicate
//! git inspection, kubeconfig generation or the fake deployment tool. It is a
//! dev-dependency only, never published, and deliberately independent of
//! `fixture-core` so that crate can use it in its own tests.
//!
//! # Modules
//!
//! - [`git`]: history and working-tree assertions on real repositories
//! - [`kubeconfig`]: minimal credential files for fake clusters
//! - [`tool`]: [`FakeTool`](tool::FakeTool), a scripted stand-in for the deployment tool
//! - [`yaml`]: loading YAML files and pulling fields out of lists

pub mod git;
pub mod kubeconfig;
pub mod tool;
pub mod yaml;
