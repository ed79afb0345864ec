use std::collections::BTreeMap;
use std::fmt;

use super::overlay::network_env_key;
use super::{BuildConfig, ConfigError};

/// A soft-convention violation. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Several networks point at the same RPC endpoint
    SharedRpcUrl { url: String, networks: Vec<String> },
    /// compilerSettings given without compilerPlugin
    SettingsWithoutPlugin,
    /// compilerPlugin given without compilerSettings
    PluginWithoutSettings,
    /// Network has no signing accounts
    NoAccounts(String),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::SharedRpcUrl { url, networks } => write!(
                f,
                "networks {} share the RPC URL {}",
                networks.join(", "),
                url
            ),
            ConfigWarning::SettingsWithoutPlugin => {
                write!(f, "compilerSettings is set but no compilerPlugin is named")
            }
            ConfigWarning::PluginWithoutSettings => write!(
                f,
                "compilerPlugin is set but compilerSettings is missing"
            ),
            ConfigWarning::NoAccounts(network) => {
                write!(f, "network {} has no accounts and can only be read", network)
            }
        }
    }
}

fn is_valid_network_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn validate_version(field: &'static str, value: &str) -> Result<(), ConfigError> {
    semver::Version::parse(value.trim())
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidVersion {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl BuildConfig {
    /// Check the configuration's invariants, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.networks.is_empty() {
            return Err(ConfigError::NoNetworks);
        }

        if !self.networks.contains_key(&self.default_network) {
            return Err(ConfigError::UnknownDefaultNetwork {
                name: self.default_network.clone(),
                available: self.network_names(),
            });
        }

        let mut env_keys: BTreeMap<String, &str> = BTreeMap::new();
        for (name, network) in &self.networks {
            if !is_valid_network_name(name) {
                return Err(ConfigError::InvalidNetworkName(name.clone()));
            }
            let key = network_env_key(name);
            if let Some(first) = env_keys.get(&key) {
                return Err(ConfigError::NetworkEnvKeyClash {
                    first: first.to_string(),
                    second: name.clone(),
                    key,
                });
            }
            env_keys.insert(key, name);
            network.parsed_url(name)?;
            if network.timeout == 0 {
                return Err(ConfigError::ZeroTimeout(name.clone()));
            }
        }

        if let Some(settings) = &self.compiler_settings {
            validate_version("compilerSettings", &settings.version)?;
        }
        validate_version("solidity", &self.solidity.version)?;

        self.paths.validate()
    }

    /// Soft-convention violations, in a stable order.
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let mut by_url: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (name, network) in &self.networks {
            by_url
                .entry(network.url.trim_end_matches('/'))
                .or_default()
                .push(name.clone());
        }
        for (url, networks) in by_url {
            if networks.len() > 1 {
                warnings.push(ConfigWarning::SharedRpcUrl {
                    url: url.to_string(),
                    networks,
                });
            }
        }

        match (&self.compiler_plugin, &self.compiler_settings) {
            (None, Some(_)) => warnings.push(ConfigWarning::SettingsWithoutPlugin),
            (Some(_), None) => warnings.push(ConfigWarning::PluginWithoutSettings),
            _ => {}
        }

        for (name, network) in &self.networks {
            if network.accounts.is_empty() {
                warnings.push(ConfigWarning::NoAccounts(name.clone()));
            }
        }

        warnings
    }
}
