//! Minimal JSON-RPC client for checking network entries.
//!
//! Only the calls needed to confirm an endpoint is reachable and serves the
//! expected chain are implemented.

use std::time::{Duration, Instant};

use futures::future::join_all;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::{BuildConfig, ConfigError, NetworkConfig};

#[derive(Error, Debug)]
pub enum RpcError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("Network {network} reports chain id {actual}, expected {expected}")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [Value],
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

pub struct RpcClient {
    http: reqwest::Client,
    url: Url,
}

impl RpcClient {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RpcError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let transport = |source| RpcError::Transport {
            url: self.url.to_string(),
            source,
        };

        let response = self
            .http
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(format!("{} from {}: {}", method, self.url, e)))?;
        if let Some(error) = body.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        body.result
            .ok_or_else(|| RpcError::InvalidResponse(format!("{} returned no result", method)))
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let value = self.call("eth_chainId", &[]).await?;
        parse_quantity(&value)
    }

    /// `eth_blockNumber`
    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let value = self.call("eth_blockNumber", &[]).await?;
        parse_quantity(&value)
    }
}

/// Decode a JSON-RPC hex quantity such as `"0x152"`.
pub fn parse_quantity(value: &Value) -> Result<u64, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| RpcError::InvalidResponse(format!("expected hex string, got {}", value)))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidResponse(format!("missing 0x prefix: {}", text)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("{}: {}", text, e)))
}

/// Outcome of probing one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub network: String,
    pub url: String,
    pub chain_id: u64,
    pub block_number: u64,
    pub latency_ms: u64,
}

/// Query a network's chain id and head block, checking the chain id against
/// the expected one when known.
pub async fn probe(name: &str, network: &NetworkConfig) -> Result<ProbeReport, RpcError> {
    let url = network.parsed_url(name)?;
    let client = RpcClient::new(url, network.timeout())?;

    let started = Instant::now();
    let chain_id = client.chain_id().await?;
    let latency = started.elapsed();
    let block_number = client.block_number().await?;

    if let Some(expected) = network.expected_chain_id(name) {
        if expected != chain_id {
            return Err(RpcError::ChainIdMismatch {
                network: name.to_string(),
                expected,
                actual: chain_id,
            });
        }
    }

    tracing::debug!(network = name, chain_id, block_number, "probe succeeded");

    Ok(ProbeReport {
        network: name.to_string(),
        url: client.url().to_string(),
        chain_id,
        block_number,
        latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
    })
}

/// Probe every configured network concurrently, in name order.
pub async fn probe_all(config: &BuildConfig) -> Vec<(String, Result<ProbeReport, RpcError>)> {
    let probes = config
        .networks
        .iter()
        .map(|(name, network)| async move { (name.clone(), probe(name, network).await) });
    join_all(probes).await
}
