//! zkbuild tools library
//!
//! Typed, validated build configuration for zk/EVM smart-contract projects:
//! networks and their signers, compiler settings and project layout.

pub mod config;
pub mod init;
pub mod rpc;
pub mod secrets;

pub use config::{BuildConfig, ConfigError, LoadOptions, LoadedConfig};
pub use secrets::{EnvSecretStore, SecretRef, SecretStore};
