//! bcdkit CLI — query an indexer and classify contracts from the terminal.
//!
//! Usage:
//! ```bash
//! # Head of every network the indexer serves
//! bcdkit stats
//!
//! # Classify a contract (FA2, FA2 factory or generic)
//! bcdkit --network ghostnet contract KT1...
//!
//! # Dump a big map
//! bcdkit bigmap 511
//!
//! # Wait for an operation to be indexed
//! bcdkit operation KT1... oo... --since 2021-03-01T12:00:00Z --wait
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use bcdkit_core::{Operation, PollConfig};
use bcdkit_http::networks::{is_known_network, KNOWN_NETWORKS};
use bcdkit_http::{BetterCallDev, IndexerConfig, BETTER_CALL_DEV_API};

mod logging;

use logging::{init_tracing, LogConfig};

#[derive(Parser)]
#[command(
    name = "bcdkit",
    about = "Classify contracts and read big maps from a Better Call Dev indexer",
    version
)]
struct Cli {
    /// JSON config file (`base_url`, `network`, `http`, `log`)
    #[arg(long, global = true, env = "BCDKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Indexer API base URL
    #[arg(long, global = true, env = "BCDKIT_API_URL")]
    api_url: Option<String>,

    /// Network name, e.g. mainnet
    #[arg(long, global = true, env = "BCDKIT_NETWORK")]
    network: Option<String>,

    /// Retries for transient failures
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level or filter directives
    #[arg(long, global = true, env = "BCDKIT_LOG")]
    log_level: Option<String>,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the head of every network the indexer serves
    Stats,

    /// Fetch and classify a contract
    Contract {
        /// Contract address (KT1...)
        address: String,
    },

    /// List every key of a big map
    #[command(name = "bigmap")]
    BigMap {
        /// Big map id
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },

    /// Look up an operation among a contract's operations
    Operation {
        /// Contract address (KT1...)
        address: String,
        /// Operation hash (oo...)
        hash: String,
        /// Only consider operations from this RFC 3339 instant on
        #[arg(long)]
        since: Option<DateTime<Utc>>,
        /// Poll until the operation is indexed
        #[arg(long)]
        wait: bool,
        /// Seconds between polls
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
        /// Give up after this many polls
        #[arg(long, default_value_t = 60)]
        max_polls: u32,
    },

    /// List networks served by the public API
    Networks,
}

/// On-disk CLI configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CliConfig {
    #[serde(flatten)]
    indexer: IndexerConfig,
    #[serde(default)]
    log: LogConfig,
}

impl Cli {
    fn load_config(&self) -> Result<CliConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => CliConfig::default(),
        };

        if let Some(url) = &self.api_url {
            config.indexer.base_url = url.clone();
        }
        if let Some(network) = &self.network {
            config.indexer.network = network.clone();
        }
        if let Some(retries) = self.retries {
            config.indexer.http.retry.max_retries = retries;
        }
        if let Some(secs) = self.timeout_secs {
            config.indexer.http.request_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        if self.json_logs {
            config.log.json = true;
        }
        Ok(config)
    }
}

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    /// `operation` finished without finding the hash.
    NotFound,
}

impl Outcome {
    /// Process exit status; `1` is reserved for errors.
    fn code(self) -> u8 {
        match self {
            Self::Done => 0,
            Self::NotFound => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.load_config() {
        Ok(config) => {
            init_tracing(&config.log);
            run(cli.command, config.indexer).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => ExitCode::from(outcome.code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: IndexerConfig) -> Result<Outcome> {
    if let Commands::Networks = command {
        cmd_networks();
        return Ok(Outcome::Done);
    }

    if config.base_url == BETTER_CALL_DEV_API && !is_known_network(&config.network) {
        tracing::warn!(network = %config.network, "network is not served by the public API");
    }
    let indexer = config.connect().context("building indexer client")?;

    match command {
        Commands::Stats => cmd_stats(&indexer).await.map(|()| Outcome::Done),
        Commands::Contract { address } => cmd_contract(&indexer, &address).await.map(|()| Outcome::Done),
        Commands::BigMap { id } => cmd_big_map(&indexer, id).await.map(|()| Outcome::Done),
        Commands::Operation {
            address,
            hash,
            since,
            wait,
            interval_secs,
            max_polls,
        } => {
            let poll = wait.then(|| PollConfig {
                interval: Duration::from_secs(interval_secs),
                max_polls,
            });
            cmd_operation(&indexer, &address, &hash, since, poll).await
        }
        Commands::Networks => Ok(Outcome::Done),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_stats(indexer: &BetterCallDev) -> Result<()> {
    let stats = indexer.stats().await.context("fetching stats")?;
    print_json(&stats)
}

async fn cmd_contract(indexer: &BetterCallDev, address: &str) -> Result<()> {
    let contract = indexer
        .contract_by_address(address)
        .await
        .with_context(|| format!("classifying {address}"))?;
    print_json(&contract)
}

async fn cmd_big_map(indexer: &BetterCallDev, id: i64) -> Result<()> {
    let values = indexer
        .big_map_by_id::<Value>(id)
        .values()
        .await
        .with_context(|| format!("reading big map {id}"))?;
    print_json(&values)
}

async fn cmd_operation(
    indexer: &BetterCallDev,
    address: &str,
    hash: &str,
    since: Option<DateTime<Utc>>,
    poll: Option<PollConfig>,
) -> Result<Outcome> {
    let op = match poll {
        Some(poll) => indexer.await_operation(address, hash, since, &poll).await,
        None => indexer.contract_operation(address, hash, since).await,
    }
    .with_context(|| format!("looking up {hash} on {address}"))?;

    report_operation(op.as_ref(), address, hash)
}

fn report_operation(op: Option<&Operation>, address: &str, hash: &str) -> Result<Outcome> {
    match op {
        Some(op) => print_json(op).map(|()| Outcome::Done),
        None => {
            eprintln!("Operation {hash} not found on {address}");
            Ok(Outcome::NotFound)
        }
    }
}

fn cmd_networks() {
    println!("Public API: {BETTER_CALL_DEV_API}\n");
    for network in KNOWN_NETWORKS {
        println!("  {network}");
    }
}
