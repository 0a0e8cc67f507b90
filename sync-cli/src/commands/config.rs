//! Show the effective configuration.

use anyhow::Result;
use tidesync_client::ClientConfig;

use crate::config::Source;

/// Run the config command.
pub fn run(config: &ClientConfig, source: &Source) -> Result<()> {
    match source {
        Source::File(path) => println!("# loaded from {}", path),
        Source::Defaults => println!("# no config file found, using defaults"),
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
