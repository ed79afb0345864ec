//! Build configuration for the contract toolchain
//!
//! This module provides the typed, validated configuration consumed by the
//! external compiler and deployment tools. Configuration is resolved in
//! priority order:
//!
//! 1. Explicit overrides (e.g. `--network` on the command line)
//! 2. Environment variables (ZKBUILD_*)
//! 3. zkbuild.toml (or zkbuild.json)
//!
//! Loading fails before anything else runs if the result is malformed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use zkbuild_tools::config::{BuildConfig, LoadOptions};
//! use zkbuild_tools::secrets::EnvSecretStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = BuildConfig::load(&LoadOptions::default())?;
//! let network = loaded.config.resolve_network(None, &EnvSecretStore)?;
//! println!("Network: {}", network.name);
//! println!("RPC URL: {}", network.url);
//! # Ok(())
//! # }
//! ```

mod compiler;
mod error;
mod network;
mod overlay;
mod paths;
mod validate;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use compiler::{
    CompilerSettings, CompilerSource, PluginOptimizer, SolidityConfig, SolidityOptimizer,
    DEFAULT_OPTIMIZER_RUNS,
};
pub use error::ConfigError;
pub use network::{KnownChain, NetworkConfig, ResolvedNetwork, DEFAULT_TIMEOUT_MS};
pub use overlay::{
    network_env_key, ENV_CONFIG_PATH, ENV_DEFAULT_NETWORK, ENV_OPTIMIZER_RUNS,
    ENV_SOLIDITY_VERSION,
};
pub use paths::{ProjectPaths, ResolvedPaths};
pub use validate::ConfigWarning;

/// File names searched for in the working directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["zkbuild.toml", "zkbuild.json"];

/// On-disk format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(ConfigFormat::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// The build configuration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfig {
    /// External compiler add-on to load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_plugin: Option<String>,
    /// Network used when none is named
    pub default_network: String,
    /// Settings for the compiler add-on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_settings: Option<CompilerSettings>,
    pub networks: BTreeMap<String, NetworkConfig>,
    #[serde(default)]
    pub paths: ProjectPaths,
    pub solidity: SolidityConfig,
}

impl BuildConfig {
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => Self::from_toml_str(content),
            ConfigFormat::Json => Self::from_json_str(content),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get configuration as JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_string_as(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => self.to_toml_string(),
            ConfigFormat::Json => self.to_json_string(),
        }
    }

    /// Look up a network by name
    pub fn network(&self, name: &str) -> Result<&NetworkConfig, ConfigError> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork {
                name: name.to_string(),
                available: self.network_names(),
            })
    }

    /// The entry named by `defaultNetwork`
    pub fn default_network_config(&self) -> Result<&NetworkConfig, ConfigError> {
        self.network(&self.default_network)
    }

    pub fn network_names(&self) -> String {
        self.networks
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Load configuration from the environment and the config file.
    ///
    /// # Resolution Order
    ///
    /// 1. Load .env if requested
    /// 2. Locate the file: explicit path, ZKBUILD_CONFIG, then
    ///    zkbuild.toml / zkbuild.json in the working directory
    /// 3. Parse by extension
    /// 4. Overlay ZKBUILD_* env vars, then the explicit network override
    /// 5. Validate
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - No config file can be found or read
    /// - The file is malformed
    /// - An environment override is malformed
    /// - Validation fails
    pub fn load(options: &LoadOptions) -> Result<LoadedConfig, ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::io(".", e))?;

        if options.dotenv {
            // Missing .env is fine
            let dotenv = cwd.join(".env");
            if dotenvy::from_path(&dotenv).is_ok() {
                tracing::debug!(path = %dotenv.display(), "loaded .env");
            }
        }

        let path = locate_config(
            options.path.as_deref(),
            std::env::var(ENV_CONFIG_PATH).ok(),
            &cwd,
        )?;

        Self::load_from(
            &path,
            utf8_vars(std::env::vars_os()),
            options.network.as_deref(),
        )
    }

    /// Load a specific file with an explicit set of environment variables.
    pub fn load_from<I, K, V>(
        path: &Path,
        vars: I,
        network_override: Option<&str>,
    ) -> Result<LoadedConfig, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let format = ConfigFormat::from_path(path)?;
        tracing::debug!(path = %path.display(), ?format, "reading configuration");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let mut config = Self::parse(&content, format)?;

        config.apply_env_overlay(vars)?;
        if let Some(network) = network_override {
            config.default_network = network.to_string();
        }

        config.validate()?;
        for warning in config.warnings() {
            tracing::warn!("{}", warning);
        }

        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let root = root.canonicalize().map_err(|e| ConfigError::io(root, e))?;

        tracing::info!(
            path = %path.display(),
            network = %config.default_network,
            networks = config.networks.len(),
            "configuration loaded"
        );

        Ok(LoadedConfig {
            config,
            path: path.to_path_buf(),
            root,
        })
    }

    /// Print the resolved configuration
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════════╗");
        println!("║              BUILD CONFIGURATION RESOLVED                      ║");
        println!("╚════════════════════════════════════════════════════════════════╝");
        println!("  Default Network:     {}", self.default_network);

        for (name, network) in &self.networks {
            println!("  Network {}:", name);
            println!("    RPC URL:           {}", network.url);
            if let Some(chain_id) = network.expected_chain_id(name) {
                println!("    Chain ID:          {}", chain_id);
            }
            if network.accounts.is_empty() {
                println!("    Accounts:          (not configured)");
            } else {
                for account in &network.accounts {
                    println!("    Account:           {}", account);
                }
            }
            println!("    Timeout:           {}ms", network.timeout);
        }

        if let Some(ref plugin) = self.compiler_plugin {
            println!("  Compiler Plugin:     {}", plugin);
        } else {
            println!("  Compiler Plugin:     (not configured)");
        }
        if let Some(settings) = &self.compiler_settings {
            println!(
                "  Plugin Compiler:     {} ({}, optimizer {})",
                settings.version,
                settings.compiler_source.as_str(),
                on_off(settings.optimizer.enabled)
            );
        }

        println!(
            "  Solidity:            {} (optimizer {}, {} runs)",
            self.solidity.version,
            on_off(self.solidity.optimizer.enabled),
            self.solidity.optimizer.runs
        );
        println!("  Sources:             {}", self.paths.sources);
        println!("  Tests:               {}", self.paths.tests);
        println!("  Artifacts:           {}", self.paths.artifacts);
        println!("  Cache:               {}", self.paths.cache);
        println!("╚════════════════════════════════════════════════════════════════╝");
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

/// Keep the variables whose name and value are both UTF-8. Anything else
/// cannot name a ZKBUILD_* setting.
fn utf8_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                tracing::debug!(var = ?key, "skipping non UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Find the configuration file to load.
pub fn locate_config(
    explicit: Option<&Path>,
    from_env: Option<String>,
    dir: &Path,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = from_env.filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .ok_or(ConfigError::MissingConfigFile)
}

/// Options for [`BuildConfig::load`]
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Config file to read instead of searching for one
    pub path: Option<PathBuf>,
    /// Overrides defaultNetwork after the environment overlay
    pub network: Option<String>,
    /// Load a .env file from the working directory first
    pub dotenv: bool,
}

/// A validated configuration and where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BuildConfig,
    /// File the configuration was read from
    pub path: PathBuf,
    /// Project root, the absolute directory containing the file
    pub root: PathBuf,
}

impl LoadedConfig {
    pub fn paths(&self) -> ResolvedPaths {
        self.config.paths.resolve(&self.root)
    }
}
