//! Indexer request descriptors and REST paths.

use serde::{Deserialize, Serialize};

use crate::types::BigMapId;

/// A single GET against the indexer, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerRequest {
    /// Path beginning with `/`, e.g. `/v1/stats`.
    pub path: String,
    /// Query string pairs, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    /// Overrides the transport's default retry budget for this request only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl IndexerRequest {
    /// Create a GET request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            max_retries: None,
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Cap the number of retries for this request (`0` disables retry).
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// REST paths exposed by the indexer (`/v1/...`).
pub mod paths {
    use super::BigMapId;

    pub fn stats() -> String {
        "/v1/stats".to_string()
    }

    pub fn contract(network: &str, address: &str) -> String {
        format!("/v1/contract/{network}/{address}")
    }

    pub fn contract_storage(network: &str, address: &str) -> String {
        format!("{}/storage", contract(network, address))
    }

    pub fn contract_operations(network: &str, address: &str) -> String {
        format!("{}/operations", contract(network, address))
    }

    pub fn big_map_keys(network: &str, id: BigMapId) -> String {
        format!("/v1/bigmap/{network}/{id}/keys")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_query_and_retries() {
        let req = IndexerRequest::get(paths::contract_operations("mainnet", "KT1abc"))
            .query("from", 1_600_000_000_000i64)
            .with_max_retries(0);
        assert_eq!(req.path, "/v1/contract/mainnet/KT1abc/operations");
        assert_eq!(req.query, vec![("from".to_string(), "1600000000000".to_string())]);
        assert_eq!(req.max_retries, Some(0));
    }

    #[test]
    fn paths_match_indexer_layout() {
        assert_eq!(paths::stats(), "/v1/stats");
        assert_eq!(paths::contract("ghostnet", "KT1x"), "/v1/contract/ghostnet/KT1x");
        assert_eq!(
            paths::contract_storage("ghostnet", "KT1x"),
            "/v1/contract/ghostnet/KT1x/storage"
        );
        assert_eq!(paths::big_map_keys("mainnet", 511), "/v1/bigmap/mainnet/511/keys");
        assert_eq!(paths::big_map_keys("mainnet", -3), "/v1/bigmap/mainnet/-3/keys");
    }
}
