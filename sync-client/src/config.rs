//! Configuration loading for tidesync clients.
//!
//! Configuration is loaded from a TOML file (default: `tidesync.toml`).
//! Every section and field is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tidesync_types::Codec;

/// Root configuration for a tidesync client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server connection.
    #[serde(default)]
    pub server: ServerConfig,
    /// Wire encoding.
    #[serde(default)]
    pub codec: CodecConfig,
    /// RPC calls.
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

/// Server connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address passed to the transport (default: ws://localhost:5800/).
    #[serde(default = "default_address")]
    pub address: String,
}

/// Wire encoding configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Frame encoding, `"json"` or `"msgpack"` (default: json).
    #[serde(default)]
    pub format: Codec,
}

/// RPC configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Milliseconds a call waits for its reply (default: 30000).
    /// Zero waits indefinitely.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive (default: info). `RUST_LOG` wins if set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_address() -> String {
    "ws://localhost:5800/".to_string()
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Set the server address.
    pub fn with_address(mut self, address: &str) -> Self {
        self.server.address = address.to_string();
        self
    }

    /// Set the wire encoding.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec.format = codec;
        self
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.server.address, "ws://localhost:5800/");
        assert_eq!(config.codec.format, Codec::Json);
        assert_eq!(config.rpc.call_timeout_ms, 30_000);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[server]
address = "ws://sync.example.com:9000/"

[codec]
format = "msgpack"

[rpc]
call_timeout_ms = 0

[log]
filter = "tidesync_client=debug"
"#;

        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "ws://sync.example.com:9000/");
        assert_eq!(config.codec.format, Codec::Msgpack);
        assert_eq!(config.rpc.call_timeout_ms, 0);
        assert_eq!(config.log.filter, "tidesync_client=debug");
    }

    #[test]
    fn config_missing_sections_use_defaults() {
        let config: ClientConfig = toml::from_str("[rpc]\n").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn unknown_codec_is_rejected() {
        let result: Result<ClientConfig, _> = toml::from_str("[codec]\nformat = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\naddress = \"ws://10.0.0.1:5800/\"").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.address, "ws://10.0.0.1:5800/");
        assert_eq!(config.rpc.call_timeout_ms, 30_000);
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn from_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rpc]\ncall_timeout_ms = \"never\"").unwrap();

        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn config_serializes_back_to_toml() {
        let config = ClientConfig::default().with_codec(Codec::Msgpack);
        let text = toml::to_string(&config).unwrap();
        let restored: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(restored, config);
    }
}
