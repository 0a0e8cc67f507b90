//! Configuration management for the tidesync CLI.

use anyhow::{Context, Result};
use std::path::Path;
use tidesync_client::ClientConfig;
use tracing_subscriber::EnvFilter;

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Loaded from this file.
    File(String),
    /// No file present; built-in defaults.
    Defaults,
}

/// Load the client configuration.
///
/// A missing file is not an error: the defaults apply. A file that exists
/// but cannot be read or parsed is.
pub fn load(path: &Path) -> Result<(ClientConfig, Source)> {
    if !path.exists() {
        return Ok((ClientConfig::default(), Source::Defaults));
    }
    let config = ClientConfig::from_file(path)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok((config, Source::File(path.display().to_string())))
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured filter.
pub fn init_logging(config: &ClientConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
