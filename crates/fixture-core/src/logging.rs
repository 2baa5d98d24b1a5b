//! Tracing subscriber setup for test runs that drive a fixture.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a tracing subscriber for fixture-driven test runs.
///
/// Filtering follows `RUST_LOG`, defaulting to "info", which shows workspace
/// lifecycle and tool invocations. `RUST_LOG=fixture_core=debug,fixture_git=debug`
/// adds every document write and commit, and `fixture_fs=trace` every file
/// written. Fails if a global subscriber is already installed, so tests call it
/// as `let _ = logging::init();`.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_test_writer()
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
