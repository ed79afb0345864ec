//! Secret references and signing-key resolution
//!
//! Network accounts never hold key material in the configuration file. Each
//! entry is a [`SecretRef`] that names where the key lives:
//!
//! - `env:NAME` reads the environment variable `NAME`
//! - `file:PATH` reads the trimmed contents of `PATH`
//!
//! References are resolved through a [`SecretStore`] when a network's signers
//! are needed, and the result is parsed into a [`PrivateKey`].

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a secp256k1 private key in bytes
pub const PRIVATE_KEY_BYTES: usize = 32;

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Invalid secret reference {0:?}. Expected env:NAME or file:PATH")]
    InvalidReference(String),

    #[error("Plaintext private keys are not allowed in configuration. Move the key to an environment variable and reference it as env:NAME")]
    PlaintextKey,

    #[error("Secret {reference} is not set")]
    Missing { reference: String },

    #[error("Failed to read secret file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Secret {reference} is not a valid private key: {reason}")]
    InvalidKey { reference: String, reason: String },
}

/// Where a secret value can be found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SecretRef {
    Env(String),
    File(PathBuf),
}

impl SecretRef {
    pub fn env(name: impl Into<String>) -> Self {
        SecretRef::Env(name.into())
    }
}

impl FromStr for SecretRef {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(name) = s.strip_prefix("env:") {
            if !is_env_var_name(name) {
                return Err(SecretError::InvalidReference(s.to_string()));
            }
            return Ok(SecretRef::Env(name.to_string()));
        }

        if let Some(path) = s.strip_prefix("file:") {
            if path.is_empty() {
                return Err(SecretError::InvalidReference(s.to_string()));
            }
            return Ok(SecretRef::File(PathBuf::from(path)));
        }

        if looks_like_key(s) {
            return Err(SecretError::PlaintextKey);
        }

        Err(SecretError::InvalidReference(s.to_string()))
    }
}

impl TryFrom<String> for SecretRef {
    type Error = SecretError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SecretRef> for String {
    fn from(value: SecretRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretRef::Env(name) => write!(f, "env:{}", name),
            SecretRef::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

fn is_env_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn looks_like_key(s: &str) -> bool {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    digits.len() >= 32 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// A resolved signing key.
///
/// Neither `Debug` nor `Display` reveal the key.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey([u8; PRIVATE_KEY_BYTES]);

impl PrivateKey {
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .unwrap_or(value);

        if digits.len() != PRIVATE_KEY_BYTES * 2 {
            return Err(format!(
                "expected {} hex digits, found {}",
                PRIVATE_KEY_BYTES * 2,
                digits.len()
            ));
        }

        let mut bytes = [0u8; PRIVATE_KEY_BYTES];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| e.to_string())?;

        if bytes.iter().all(|b| *b == 0) {
            return Err("key must not be zero".to_string());
        }

        Ok(PrivateKey(bytes))
    }

    /// The key as `0x` followed by 64 lowercase hex digits, for handing to a
    /// signer.
    pub fn expose_secret(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_BYTES] {
        self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&"[REDACTED]").finish()
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x****{}", hex::encode(&self.0[PRIVATE_KEY_BYTES - 2..]))
    }
}

/// Resolves secret references to their values.
pub trait SecretStore {
    fn resolve(&self, reference: &SecretRef) -> Result<String, SecretError>;

    /// Resolve a reference and parse it as a private key.
    fn resolve_key(&self, reference: &SecretRef) -> Result<PrivateKey, SecretError> {
        let raw = self.resolve(reference)?;
        PrivateKey::parse(&raw).map_err(|reason| SecretError::InvalidKey {
            reference: reference.to_string(),
            reason,
        })
    }
}

/// Reads `env:` references from the process environment and `file:`
/// references from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn resolve(&self, reference: &SecretRef) -> Result<String, SecretError> {
        let value = match reference {
            SecretRef::Env(name) => std::env::var(name).unwrap_or_default(),
            SecretRef::File(path) => {
                std::fs::read_to_string(path).map_err(|source| SecretError::Unreadable {
                    path: path.clone(),
                    source,
                })?
            }
        };

        let value = value.trim();
        if value.is_empty() {
            return Err(SecretError::Missing {
                reference: reference.to_string(),
            });
        }
        Ok(value.to_string())
    }
}

/// In-memory store for embedding callers and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySecretStore {
    values: HashMap<SecretRef, String>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: SecretRef, value: impl Into<String>) {
        self.values.insert(reference, value.into());
    }

    pub fn with_env(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(SecretRef::env(name), value);
        self
    }
}

impl SecretStore for MemorySecretStore {
    fn resolve(&self, reference: &SecretRef) -> Result<String, SecretError> {
        self.values
            .get(reference)
            .cloned()
            .ok_or_else(|| SecretError::Missing {
                reference: reference.to_string(),
            })
    }
}
