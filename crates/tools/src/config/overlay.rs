//! Environment variable overlay.
//!
//! Recognised variables:
//!
//! - `ZKBUILD_DEFAULT_NETWORK`
//! - `ZKBUILD_SOLIDITY_VERSION`
//! - `ZKBUILD_OPTIMIZER_RUNS`
//! - `ZKBUILD_NETWORK_<KEY>_URL`
//! - `ZKBUILD_NETWORK_<KEY>_ACCOUNTS` (comma-separated secret references)
//!
//! `<KEY>` is the network name in SCREAMING_SNAKE_CASE.

use crate::secrets::SecretRef;

use super::{BuildConfig, ConfigError};

pub const ENV_PREFIX: &str = "ZKBUILD_";
pub const ENV_CONFIG_PATH: &str = "ZKBUILD_CONFIG";
pub const ENV_DEFAULT_NETWORK: &str = "ZKBUILD_DEFAULT_NETWORK";
pub const ENV_SOLIDITY_VERSION: &str = "ZKBUILD_SOLIDITY_VERSION";
pub const ENV_OPTIMIZER_RUNS: &str = "ZKBUILD_OPTIMIZER_RUNS";

const NETWORK_PREFIX: &str = "ZKBUILD_NETWORK_";

/// `cronosTestnet` -> `CRONOS_TESTNET`, `zk-sync.local` -> `ZK_SYNC_LOCAL`
pub fn network_env_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            key.push('_');
        }
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_uppercase());
        } else {
            key.push('_');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
    }
    key
}

impl BuildConfig {
    /// Apply `ZKBUILD_*` overrides from `vars`. Unrelated variables are ignored.
    pub fn apply_env_overlay<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            if !key.starts_with(ENV_PREFIX) || key == ENV_CONFIG_PATH {
                continue;
            }
            self.apply_env_var(key, value)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            ENV_DEFAULT_NETWORK => {
                tracing::debug!(network = value, "defaultNetwork overridden from environment");
                self.default_network = value.to_string();
            }
            ENV_SOLIDITY_VERSION => {
                tracing::debug!(version = value, "solidity version overridden from environment");
                self.solidity.version = value.to_string();
            }
            ENV_OPTIMIZER_RUNS => {
                self.solidity.optimizer.runs =
                    value.parse().map_err(|e| ConfigError::InvalidEnvValue {
                        var: key.to_string(),
                        reason: format!("{} ({:?})", e, value),
                    })?;
            }
            _ => {
                if let Some(rest) = key.strip_prefix(NETWORK_PREFIX) {
                    self.apply_network_var(key, rest, value)?;
                } else {
                    tracing::debug!(var = key, "ignoring unrecognised variable");
                }
            }
        }
        Ok(())
    }

    fn apply_network_var(&mut self, key: &str, rest: &str, value: &str) -> Result<(), ConfigError> {
        let (env_key, field) = if let Some(k) = rest.strip_suffix("_URL") {
            (k, "url")
        } else if let Some(k) = rest.strip_suffix("_ACCOUNTS") {
            (k, "accounts")
        } else {
            tracing::warn!(var = key, "unrecognised network variable");
            return Ok(());
        };

        let Some(network) = self
            .networks
            .iter_mut()
            .find_map(|(name, network)| (network_env_key(name) == env_key).then_some(network))
        else {
            tracing::warn!(var = key, "variable names a network that is not configured");
            return Ok(());
        };

        match field {
            "url" => network.url = value.to_string(),
            _ => {
                network.accounts = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse::<SecretRef>().map_err(|e| ConfigError::InvalidEnvValue {
                            var: key.to_string(),
                            reason: e.to_string(),
                        })
                    })
                    .collect::<Result<_, _>>()?;
            }
        }
        tracing::debug!(var = key, "network {} overridden from environment", field);
        Ok(())
    }
}
