//! Network profiles for the public Better Call Dev API.
//!
//! The public instance is shared and rate limited, so profiles built here use
//! a slower backoff than the client default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use bcdkit_core::error::IndexerError;
use bcdkit_core::indexer::Indexer;
use bcdkit_core::policy::RetryConfig;

use crate::client::{HttpClientConfig, HttpIndexerClient};

/// Base URL of the public Better Call Dev API.
pub const BETTER_CALL_DEV_API: &str = "https://api.better-call.dev";

/// Networks served by the public API.
pub const KNOWN_NETWORKS: &[&str] = &["mainnet", "ghostnet"];

/// Where and how to reach an indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub base_url: String,
    pub network: String,
    pub http: HttpClientConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            base_url: BETTER_CALL_DEV_API.to_string(),
            network: "mainnet".to_string(),
            http: HttpClientConfig::default(),
        }
    }
}

impl IndexerConfig {
    /// Public API profile for `network`.
    pub fn better_call_dev(network: impl Into<String>) -> Self {
        Self {
            base_url: BETTER_CALL_DEV_API.to_string(),
            network: network.into(),
            http: public_http_config(),
        }
    }

    /// Build the HTTP transport and wrap it in an [`Indexer`].
    pub fn connect(self) -> Result<Indexer<HttpIndexerClient>, IndexerError> {
        tracing::debug!(base_url = %self.base_url, network = %self.network, "connecting to indexer");
        let client = HttpIndexerClient::new(self.base_url, self.http)?;
        Ok(Indexer::new(client, self.network))
    }
}

fn public_http_config() -> HttpClientConfig {
    HttpClientConfig {
        retry: RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_fraction: 0.2,
        },
        ..HttpClientConfig::default()
    }
}

/// Indexer for `network` on the public Better Call Dev API.
pub fn better_call_dev(network: &str) -> Result<Indexer<HttpIndexerClient>, IndexerError> {
    IndexerConfig::better_call_dev(network).connect()
}

/// Returns `true` if the public API serves `network`.
pub fn is_known_network(network: &str) -> bool {
    KNOWN_NETWORKS.contains(&network)
}
