use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use zkbuild_tools::config::{BuildConfig, ConfigFormat, LoadOptions, LoadedConfig};
use zkbuild_tools::init::{init, InitOptions};
use zkbuild_tools::rpc;
use zkbuild_tools::secrets::EnvSecretStore;

#[derive(Parser)]
#[command(name = "zkbuild")]
#[command(version, about = "Load, validate and inspect smart-contract build configuration")]
struct Cli {
    /// Config file (default: $ZKBUILD_CONFIG, then ./zkbuild.toml or ./zkbuild.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override defaultNetwork
    #[arg(short, long, global = true)]
    network: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration
    Validate {
        /// Also resolve every network's signing keys
        #[arg(long)]
        resolve_secrets: bool,
    },
    /// Print the loaded configuration
    Show {
        #[arg(short, long, value_enum, default_value_t = ShowFormat::Text)]
        format: ShowFormat,
    },
    /// Print the resolved project directories
    Paths,
    /// Resolve the signing keys of a network
    Accounts {
        /// Network name (default: defaultNetwork)
        name: Option<String>,
    },
    /// Check that RPC endpoints answer with the expected chain
    Probe {
        /// Network name (default: defaultNetwork)
        name: Option<String>,
        /// Probe every configured network
        #[arg(long, conflicts_with = "name")]
        all: bool,
    },
    /// Write a starter zkbuild.toml and .env.example
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ShowFormat {
    Text,
    Toml,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let options = LoadOptions {
        path: cli.config.clone(),
        network: cli.network.clone(),
        dotenv: true,
    };

    match cli.command {
        Commands::Validate { resolve_secrets } => cmd_validate(&options, resolve_secrets),
        Commands::Show { format } => cmd_show(&options, format),
        Commands::Paths => cmd_paths(&options),
        Commands::Accounts { name } => cmd_accounts(&options, name.as_deref()),
        Commands::Probe { name, all } => cmd_probe(&options, name.as_deref(), all).await,
        Commands::Init { dir, force } => cmd_init(dir, force),
    }
}

fn load(options: &LoadOptions) -> Result<LoadedConfig> {
    BuildConfig::load(options).context("Failed to load configuration")
}

fn cmd_validate(options: &LoadOptions, resolve_secrets: bool) -> Result<()> {
    let loaded = load(options)?;
    let config = &loaded.config;

    if resolve_secrets {
        for name in config.networks.keys() {
            let network = config.resolve_network(Some(name.as_str()), &EnvSecretStore)?;
            println!("  {}: {} signer(s) resolved", name, network.signers.len());
        }
    }

    let warnings = config.warnings();
    for warning in &warnings {
        eprintln!("⚠ {}", warning);
    }
    println!(
        "✓ {} is valid ({} network(s), {} warning(s))",
        loaded.path.display(),
        config.networks.len(),
        warnings.len()
    );
    Ok(())
}

fn cmd_show(options: &LoadOptions, format: ShowFormat) -> Result<()> {
    let loaded = load(options)?;
    match format {
        ShowFormat::Text => loaded.config.print_summary(),
        ShowFormat::Toml => print!("{}", loaded.config.to_string_as(ConfigFormat::Toml)?),
        ShowFormat::Json => println!("{}", loaded.config.to_string_as(ConfigFormat::Json)?),
    }
    Ok(())
}

fn cmd_paths(options: &LoadOptions) -> Result<()> {
    let paths = load(options)?.paths();
    println!("  Root:       {}", paths.root.display());
    println!("  Sources:    {}", paths.sources.display());
    println!("  Tests:      {}", paths.tests.display());
    println!("  Artifacts:  {}", paths.artifacts.display());
    println!("  Cache:      {}", paths.cache.display());
    Ok(())
}

fn cmd_accounts(options: &LoadOptions, name: Option<&str>) -> Result<()> {
    let loaded = load(options)?;
    let network = loaded.config.resolve_network(name, &EnvSecretStore)?;

    println!("Network {} ({})", network.name, network.url);
    if network.signers.is_empty() {
        println!("  (no accounts configured)");
    }
    for (index, signer) in network.signers.iter().enumerate() {
        println!("  #{}: {}", index, signer);
    }
    Ok(())
}

async fn cmd_probe(options: &LoadOptions, name: Option<&str>, all: bool) -> Result<()> {
    let loaded = load(options)?;
    let config = &loaded.config;

    let results = if all {
        rpc::probe_all(config).await
    } else {
        let name = name.unwrap_or(&config.default_network);
        let network = config.network(name)?;
        vec![(name.to_string(), rpc::probe(name, network).await)]
    };

    let mut failures = 0;
    for (name, result) in &results {
        match result {
            Ok(report) => println!(
                "✓ {}: chain {} at block {} ({}ms)",
                name, report.chain_id, report.block_number, report.latency_ms
            ),
            Err(e) => {
                failures += 1;
                eprintln!("✗ {}: {}", name, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} network(s) failed", failures, results.len());
    }
    Ok(())
}

fn cmd_init(dir: PathBuf, force: bool) -> Result<()> {
    let result = init(&InitOptions { dir, force }).context("Failed to initialize configuration")?;
    println!("✓ Wrote {}", result.config.display());
    println!("✓ Wrote {}", result.env_example.display());
    println!();
    println!("Next steps:");
    println!("  1. Copy .env.example to .env and fill in the deployer keys");
    println!("  2. Run: zkbuild validate --resolve-secrets");
    Ok(())
}
