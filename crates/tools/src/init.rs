//! Scaffold a new project configuration.
//!
//! Writes a starter `zkbuild.toml` and a `.env.example` listing the secrets
//! it references.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Starter configuration
pub const CONFIG_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../zkbuild.toml"));

/// Secrets referenced by [`CONFIG_TEMPLATE`]
pub const ENV_EXAMPLE_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../.env.example"));

#[derive(Debug, Error)]
pub enum InitError {
    #[error("file already exists: {} (use --force to overwrite)", path.display())]
    PathExists { path: PathBuf },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write file {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub struct InitOptions {
    /// Directory to write into
    pub dir: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

#[derive(Debug)]
pub struct InitResult {
    pub config: PathBuf,
    pub env_example: PathBuf,
}

pub fn init(options: &InitOptions) -> Result<InitResult, InitError> {
    let dir = &options.dir;
    fs::create_dir_all(dir).map_err(|source| InitError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let config = dir.join("zkbuild.toml");
    let env_example = dir.join(".env.example");

    if !options.force {
        for path in [&config, &env_example] {
            if path.exists() {
                return Err(InitError::PathExists { path: path.clone() });
            }
        }
    }

    write(&config, CONFIG_TEMPLATE)?;
    write(&env_example, ENV_EXAMPLE_TEMPLATE)?;
    tracing::info!(dir = %dir.display(), "initialized configuration");

    Ok(InitResult {
        config,
        env_example,
    })
}

fn write(path: &Path, content: &str) -> Result<(), InitError> {
    fs::write(path, content).map_err(|source| InitError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
