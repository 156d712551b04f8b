//! Tracing setup for the `docscope` binary.
//!
//! Logs go to stderr so stdout carries nothing but the JSON result.
//! `RUST_LOG` controls the filter and defaults to `info`.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
