//! Network entries and signer resolution.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::{BuildConfig, ConfigError};
use crate::secrets::{PrivateKey, SecretRef, SecretStore};

/// Default RPC request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// A named deployment target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NetworkConfig {
    /// RPC endpoint URL
    pub url: String,
    /// Signing keys, by reference
    #[serde(default)]
    pub accounts: Vec<SecretRef>,
    /// Expected chain id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl NetworkConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            accounts: Vec::new(),
            chain_id: None,
            timeout: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Chain id this network should report: the configured one, else the
    /// well-known id for the network name.
    pub fn expected_chain_id(&self, name: &str) -> Option<u64> {
        self.chain_id
            .or_else(|| KnownChain::from_name(name).map(|chain| chain.chain_id()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    pub(crate) fn parsed_url(&self, name: &str) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRpcUrl {
            network: name.to_string(),
            reason,
        };

        let url = Url::parse(&self.url).map_err(|e| invalid(format!("{} ({:?})", e, self.url)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid(format!(
                "RPC URL must start with http:// or https://: {}",
                self.url
            )));
        }
        if url.host_str().is_none() {
            return Err(invalid(format!("RPC URL has no host: {}", self.url)));
        }
        Ok(url)
    }
}

/// Chains whose ids are known by network name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownChain {
    Cronos,
    CronosTestnet,
    ZkSyncEra,
    ZkSyncSepolia,
    Localhost,
}

impl KnownChain {
    pub const ALL: [KnownChain; 5] = [
        KnownChain::Cronos,
        KnownChain::CronosTestnet,
        KnownChain::ZkSyncEra,
        KnownChain::ZkSyncSepolia,
        KnownChain::Localhost,
    ];

    /// Network name as used in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownChain::Cronos => "cronos",
            KnownChain::CronosTestnet => "cronosTestnet",
            KnownChain::ZkSyncEra => "zkSyncEra",
            KnownChain::ZkSyncSepolia => "zkSyncSepolia",
            KnownChain::Localhost => "localhost",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|chain| chain.as_str().eq_ignore_ascii_case(name))
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            KnownChain::Cronos => 25,
            KnownChain::CronosTestnet => 338,
            KnownChain::ZkSyncEra => 324,
            KnownChain::ZkSyncSepolia => 300,
            KnownChain::Localhost => 31337,
        }
    }
}

/// A network with its signers resolved, ready to hand to a deploy tool
#[derive(Debug, Clone)]
pub struct ResolvedNetwork {
    pub name: String,
    pub url: Url,
    pub chain_id: Option<u64>,
    pub timeout: Duration,
    pub signers: Vec<PrivateKey>,
}

impl BuildConfig {
    /// Resolve a network's RPC URL and signing keys.
    ///
    /// `name` defaults to `defaultNetwork`. Fails on the first account whose
    /// secret is missing or malformed.
    pub fn resolve_network(
        &self,
        name: Option<&str>,
        store: &dyn SecretStore,
    ) -> Result<ResolvedNetwork, ConfigError> {
        let name = name.unwrap_or(&self.default_network);
        let network = self.network(name)?;
        let url = network.parsed_url(name)?;

        let signers = network
            .accounts
            .iter()
            .enumerate()
            .map(|(index, reference)| {
                store
                    .resolve_key(reference)
                    .map_err(|source| ConfigError::Secret {
                        network: name.to_string(),
                        index,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if signers.is_empty() {
            tracing::warn!(network = name, "network has no accounts configured");
        }
        tracing::debug!(network = name, signers = signers.len(), "resolved network");

        Ok(ResolvedNetwork {
            name: name.to_string(),
            url,
            chain_id: network.expected_chain_id(name),
            timeout: network.timeout(),
            signers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chain_from_name() {
        assert_eq!(
            KnownChain::from_name("cronosTestnet"),
            Some(KnownChain::CronosTestnet)
        );
        assert_eq!(KnownChain::from_name("CRONOS"), Some(KnownChain::Cronos));
        assert_eq!(KnownChain::from_name("mainnet"), None);
    }

    #[test]
    fn test_known_chain_ids() {
        assert_eq!(KnownChain::CronosTestnet.chain_id(), 338);
        assert_eq!(KnownChain::ZkSyncEra.chain_id(), 324);
        for chain in KnownChain::ALL {
            assert_eq!(KnownChain::from_name(chain.as_str()), Some(chain));
        }
    }

    #[test]
    fn test_expected_chain_id_prefers_configured() {
        let mut network = NetworkConfig::new("https://evm-t3.cronos.org/");
        assert_eq!(network.expected_chain_id("cronosTestnet"), Some(338));
        assert_eq!(network.expected_chain_id("fuse"), None);

        network.chain_id = Some(123);
        assert_eq!(network.expected_chain_id("cronosTestnet"), Some(123));
    }

    #[test]
    fn test_parsed_url_rejects_bad_urls() {
        for bad in ["", "not a url", "ftp://example.com", "evm-t3.cronos.org"] {
            assert!(
                NetworkConfig::new(bad).parsed_url("x").is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_network_defaults_from_toml() {
        let network: NetworkConfig = toml::from_str(r#"url = "http://127.0.0.1:8545""#).unwrap();
        assert!(network.accounts.is_empty());
        assert_eq!(network.timeout, DEFAULT_TIMEOUT_MS);
        assert_eq!(network.chain_id, None);
    }

    #[test]
    fn test_network_rejects_literal_key() {
        let result: Result<NetworkConfig, _> = toml::from_str(
            r#"
            url = "https://evm-t3.cronos.org/"
            accounts = ["0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"]
            "#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Plaintext private keys"), "{err}");
    }
}
