use std::path::PathBuf;

use thiserror::Error;

use crate::secrets::SecretError;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported config format for {0}. Expected a .toml or .json file")]
    UnsupportedFormat(PathBuf),

    #[error("No zkbuild.toml or zkbuild.json found and ZKBUILD_CONFIG is not set")]
    MissingConfigFile,

    #[error("No networks configured")]
    NoNetworks,

    #[error("Invalid network name {0:?}. Use letters, digits, '-' or '_'")]
    InvalidNetworkName(String),

    #[error("defaultNetwork {name:?} is not defined in networks (available: {available})")]
    UnknownDefaultNetwork { name: String, available: String },

    #[error("Networks {first:?} and {second:?} both map to ZKBUILD_NETWORK_{key}_*. Rename one of them")]
    NetworkEnvKeyClash {
        first: String,
        second: String,
        key: String,
    },

    #[error("Unknown network {name:?} (available: {available})")]
    UnknownNetwork { name: String, available: String },

    #[error("Invalid RPC URL for network {network}: {reason}")]
    InvalidRpcUrl { network: String, reason: String },

    #[error("Invalid {field} version {value:?}: {reason}")]
    InvalidVersion {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("paths.{0} must not be empty")]
    EmptyPath(&'static str),

    #[error("Network {0} has a zero request timeout")]
    ZeroTimeout(String),

    #[error("Invalid value for {var}: {reason}")]
    InvalidEnvValue { var: String, reason: String },

    #[error("Account #{index} of network {network}: {source}")]
    Secret {
        network: String,
        index: usize,
        #[source]
        source: SecretError,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}
