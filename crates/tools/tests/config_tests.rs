//! Loading configuration files from disk.

use std::path::PathBuf;

use tempfile::TempDir;
use zkbuild_tools::config::{BuildConfig, ConfigError, LoadOptions};
use zkbuild_tools::secrets::MemorySecretStore;

const KEY: &str = "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

const CONFIG: &str = r#"
compilerPlugin = "@matterlabs/hardhat-zksync-solc"
defaultNetwork = "cronosTestnet"

[compilerSettings]
version = "1.3.9"
compilerSource = "binary"
optimizer = { enabled = true }

[networks.cronos]
url = "https://rpc.fusespark.io/"
accounts = ["env:CRONOS_DEPLOYER_KEY"]

[networks.cronosTestnet]
url = "https://evm-t3.cronos.org/"
accounts = ["env:CRONOS_TESTNET_DEPLOYER_KEY"]

[paths]
artifacts = "./artifacts-zk"
cache = "./cache-zk"

[solidity]
version = "0.8.20"
optimizer = { enabled = true, runs = 200 }
"#;

fn write_config(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(name);
    std::fs::write(&path, content).unwrap();
    (temp, path)
}

fn no_env() -> Vec<(String, String)> {
    Vec::new()
}

#[test]
fn loads_toml_and_resolves_root() {
    let (temp, path) = write_config("zkbuild.toml", CONFIG);
    let loaded = BuildConfig::load_from(&path, no_env(), None).unwrap();

    assert_eq!(loaded.config.default_network, "cronosTestnet");
    assert_eq!(loaded.root, temp.path().canonicalize().unwrap());

    let paths = loaded.paths();
    assert_eq!(paths.artifacts, loaded.root.join("artifacts-zk"));
    assert_eq!(paths.sources, loaded.root.join("contracts"));
    assert_eq!(paths.tests, loaded.root.join("test"));
}

#[test]
fn toml_and_json_load_identically() {
    let (_t1, toml_path) = write_config("zkbuild.toml", CONFIG);
    let from_toml = BuildConfig::load_from(&toml_path, no_env(), None)
        .unwrap()
        .config;

    let json = from_toml.to_json_string().unwrap();
    let (_t2, json_path) = write_config("zkbuild.json", &json);
    let from_json = BuildConfig::load_from(&json_path, no_env(), None)
        .unwrap()
        .config;

    assert_eq!(from_toml, from_json);
}

#[test]
fn reloading_serialized_config_is_idempotent() {
    let (_temp, path) = write_config("zkbuild.toml", CONFIG);
    let first = BuildConfig::load_from(&path, no_env(), None).unwrap().config;

    std::fs::write(&path, first.to_toml_string().unwrap()).unwrap();
    let second = BuildConfig::load_from(&path, no_env(), None).unwrap().config;

    assert_eq!(first, second);
}

#[test]
fn unknown_default_network_fails_before_anything_else() {
    let content = CONFIG.replace(
        "defaultNetwork = \"cronosTestnet\"",
        "defaultNetwork = \"mainnet\"",
    );
    let (_temp, path) = write_config("zkbuild.toml", &content);

    match BuildConfig::load_from(&path, no_env(), None) {
        Err(ConfigError::UnknownDefaultNetwork { name, .. }) => assert_eq!(name, "mainnet"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn env_overlay_and_override_apply_in_order() {
    let (_temp, path) = write_config("zkbuild.toml", CONFIG);
    let vars = [
        ("ZKBUILD_DEFAULT_NETWORK", "cronos"),
        ("ZKBUILD_NETWORK_CRONOS_URL", "https://evm.cronos.org/"),
    ];

    let loaded = BuildConfig::load_from(&path, vars, None).unwrap();
    assert_eq!(loaded.config.default_network, "cronos");
    assert_eq!(loaded.config.networks["cronos"].url, "https://evm.cronos.org/");

    let loaded = BuildConfig::load_from(&path, vars, Some("cronosTestnet")).unwrap();
    assert_eq!(loaded.config.default_network, "cronosTestnet");
}

#[test]
fn env_overlay_is_validated() {
    let (_temp, path) = write_config("zkbuild.toml", CONFIG);
    let vars = [("ZKBUILD_NETWORK_CRONOS_URL", "not-a-url")];
    assert!(matches!(
        BuildConfig::load_from(&path, vars, None),
        Err(ConfigError::InvalidRpcUrl { .. })
    ));
}

#[test]
fn colliding_network_env_keys_rejected() {
    let content = CONFIG.replace(
        "[paths]",
        "[networks.cronos_testnet]\nurl = \"https://other.example/\"\n\n[paths]",
    );
    let (_temp, path) = write_config("zkbuild.toml", &content);
    let vars = [("ZKBUILD_NETWORK_CRONOS_TESTNET_URL", "http://127.0.0.1:8545")];
    assert!(matches!(
        BuildConfig::load_from(&path, vars, None),
        Err(ConfigError::NetworkEnvKeyClash { .. })
    ));
}

#[test]
fn negative_runs_rejected_at_load() {
    let content = CONFIG.replace("runs = 200", "runs = -1");
    let (_temp, path) = write_config("zkbuild.toml", &content);
    assert!(matches!(
        BuildConfig::load_from(&path, no_env(), None),
        Err(ConfigError::TomlError(_))
    ));
}

#[test]
fn plaintext_key_rejected_at_load() {
    let content = CONFIG.replace("env:CRONOS_DEPLOYER_KEY", KEY);
    let (_temp, path) = write_config("zkbuild.toml", &content);
    let err = BuildConfig::load_from(&path, no_env(), None).unwrap_err();
    assert!(err.to_string().contains("Plaintext private keys"), "{err}");
}

#[test]
fn unsupported_extension_rejected() {
    let (_temp, path) = write_config("hardhat.config.js", CONFIG);
    assert!(matches!(
        BuildConfig::load_from(&path, no_env(), None),
        Err(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("zkbuild.toml");
    assert!(matches!(
        BuildConfig::load_from(&path, no_env(), None),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn explicit_path_through_load_options() {
    let (_temp, path) = write_config("custom.toml", CONFIG);
    let loaded = BuildConfig::load(&LoadOptions {
        path: Some(path.clone()),
        network: Some("cronos".to_string()),
        dotenv: false,
    })
    .unwrap();
    assert_eq!(loaded.path, path);
    assert_eq!(loaded.config.default_network, "cronos");
}

#[test]
fn signers_resolve_through_store() {
    let (_temp, path) = write_config("zkbuild.toml", CONFIG);
    let config = BuildConfig::load_from(&path, no_env(), None).unwrap().config;

    let store = MemorySecretStore::new()
        .with_env("CRONOS_DEPLOYER_KEY", KEY)
        .with_env("CRONOS_TESTNET_DEPLOYER_KEY", &KEY[2..]);

    for name in ["cronos", "cronosTestnet"] {
        let network = config.resolve_network(Some(name), &store).unwrap();
        assert_eq!(network.signers.len(), 1);
        assert_eq!(network.signers[0].expose_secret(), KEY);
    }
}

#[test]
fn malformed_secret_is_reported_with_network() {
    let (_temp, path) = write_config("zkbuild.toml", CONFIG);
    let config = BuildConfig::load_from(&path, no_env(), None).unwrap().config;

    // One hex digit too many
    let store = MemorySecretStore::new().with_env("CRONOS_TESTNET_DEPLOYER_KEY", format!("{}0", KEY));
    let err = config.resolve_network(None, &store).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("cronosTestnet"), "{message}");
    assert!(!message.contains(&KEY[2..]), "secret leaked: {message}");
}
