//! `Indexer` — the resolver façade over an [`IndexerTransport`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::bigmap::BigMap;
use crate::classifier;
use crate::error::IndexerError;
use crate::request::{paths, IndexerRequest};
use crate::transport::IndexerTransport;
use crate::types::{BigMapId, Contract, NetworkStats, Operation, OperationsPage};

/// HTTP status the indexer answers with while an operation is not indexed yet.
const NOT_INDEXED_STATUS: u16 = 500;

/// How `await_operation` polls for an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between two lookups.
    #[serde(with = "secs")]
    pub interval: Duration,
    /// Total number of lookups before giving up.
    pub max_polls: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: 60,
        }
    }
}

/// Client for one network of an indexer.
pub struct Indexer<T> {
    transport: T,
    network: String,
}

impl<T: IndexerTransport> Indexer<T> {
    pub fn new(transport: T, network: impl Into<String>) -> Self {
        Self {
            transport,
            network: network.into(),
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Head snapshot of every network the indexer serves.
    pub async fn stats(&self) -> Result<Vec<NetworkStats>, IndexerError> {
        self.transport.fetch(IndexerRequest::get(paths::stats())).await
    }

    /// Fetch and classify the contract at `address`.
    pub async fn contract_by_address(&self, address: &str) -> Result<Contract, IndexerError> {
        classifier::classify(&self.transport, &self.network, address).await
    }

    /// Handle on big map `id`; values decode into `V`.
    pub fn big_map_by_id<V: DeserializeOwned>(&self, id: BigMapId) -> BigMap<'_, T, V> {
        BigMap::new(&self.transport, self.network.clone(), id)
    }

    /// Look up operation `hash` among the operations of `contract_address`.
    ///
    /// `since` narrows the listing to operations from that instant on. The
    /// lookup is never retried: a missing operation is the common case.
    /// Returns `Ok(None)` when the hash is not listed, and also when the
    /// indexer answers `500`, which it does for operations it has not indexed
    /// yet. Every other error is returned.
    pub async fn contract_operation(
        &self,
        contract_address: &str,
        hash: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Option<Operation>, IndexerError> {
        let mut req = IndexerRequest::get(paths::contract_operations(&self.network, contract_address))
            .with_max_retries(0);
        if let Some(since) = since {
            req = req.query("from", since.timestamp_millis());
        }

        match self.transport.fetch::<OperationsPage>(req).await {
            Ok(page) => Ok(page.find(hash)?),
            Err(e) if e.status() == Some(NOT_INDEXED_STATUS) => {
                tracing::debug!(hash, contract = contract_address, "operation not indexed yet");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Poll [`Indexer::contract_operation`] until the operation shows up.
    ///
    /// Returns `Ok(None)` once `poll.max_polls` lookups found nothing.
    pub async fn await_operation(
        &self,
        contract_address: &str,
        hash: &str,
        since: Option<DateTime<Utc>>,
        poll: &PollConfig,
    ) -> Result<Option<Operation>, IndexerError> {
        for attempt in 1..=poll.max_polls {
            if let Some(op) = self.contract_operation(contract_address, hash, since).await? {
                return Ok(Some(op));
            }
            if attempt < poll.max_polls {
                tracing::debug!(hash, attempt, "operation not found, polling again");
                tokio::time::sleep(poll.interval).await;
            }
        }
        Ok(None)
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    use crate::mock::MockTransport;
    use crate::types::OperationStatus;

    const OPS: &str = "/v1/contract/mainnet/KT1ops/operations";

    fn ops_body() -> Value {
        json!({
            "operations": [
                { "hash": "ooA", "status": "applied", "timestamp": "2021-03-01T12:00:00Z" },
                { "hash": "ooB", "status": "failed", "timestamp": "2021-03-01T12:01:00Z",
                  "errors": [{ "id": "proto.script_rejected" }] }
            ]
        })
    }

    #[tokio::test]
    async fn stats_maps_chain_id() {
        let transport = MockTransport::new().route(
            "/v1/stats",
            json!([{
                "chain_id": "NetXdQprcVkpaWU", "hash": "BLx", "level": 10,
                "network": "mainnet", "predecessor": "BLw", "protocol": "PsFLor",
                "timestamp": "2021-05-01T00:00:00Z"
            }]),
        );
        let stats = Indexer::new(transport, "mainnet").stats().await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].chain_id, "NetXdQprcVkpaWU");
        assert_eq!(serde_json::to_value(&stats[0]).unwrap()["chainId"], "NetXdQprcVkpaWU");
    }

    #[tokio::test]
    async fn contract_operation_finds_hash_without_retry() {
        let indexer = Indexer::new(MockTransport::new().route(OPS, ops_body()), "mainnet");

        let op = indexer.contract_operation("KT1ops", "ooB", None).await.unwrap().unwrap();
        assert_eq!(op.status, OperationStatus::Failed);
        assert_eq!(op.errors.as_ref().map(Vec::len), Some(1));

        let reqs = indexer.transport().requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].max_retries, Some(0));
        assert!(reqs[0].query.is_empty());
    }

    #[tokio::test]
    async fn contract_operation_passes_since_as_epoch_millis() {
        let indexer = Indexer::new(MockTransport::new().route(OPS, ops_body()), "mainnet");
        let since = Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap();

        indexer.contract_operation("KT1ops", "ooA", Some(since)).await.unwrap();

        let reqs = indexer.transport().requests();
        assert_eq!(reqs[0].query, vec![("from".to_string(), "1614556800000".to_string())]);
    }

    #[tokio::test]
    async fn contract_operation_unknown_hash_is_none() {
        let indexer = Indexer::new(MockTransport::new().route(OPS, ops_body()), "mainnet");
        assert!(indexer.contract_operation("KT1ops", "ooZ", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn contract_operation_skips_entries_it_cannot_decode() {
        let indexer = Indexer::new(
            MockTransport::new().route(
                OPS,
                json!({ "operations": [
                    { "hash": "ooMempool", "status": "pending", "timestamp": "2021-03-01T12:00:00Z" },
                    { "hash": "ooOdd", "kind": "event" },
                    { "hash": "ooWanted", "status": "applied", "timestamp": "2021-03-01T12:00:30Z" }
                ]}),
            ),
            "mainnet",
        );

        let op = indexer.contract_operation("KT1ops", "ooWanted", None).await.unwrap().unwrap();
        assert_eq!(op.hash, "ooWanted");
        assert_eq!(op.status, OperationStatus::Applied);
    }

    #[tokio::test]
    async fn contract_operation_rejects_a_malformed_match() {
        let indexer = Indexer::new(
            MockTransport::new().route(
                OPS,
                json!({ "operations": [
                    { "hash": "ooMempool", "status": "pending", "timestamp": "2021-03-01T12:00:00Z" }
                ]}),
            ),
            "mainnet",
        );

        let err = indexer.contract_operation("KT1ops", "ooMempool", None).await.unwrap_err();
        assert!(matches!(err, IndexerError::Deserialization(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn contract_operation_treats_500_as_not_found() {
        let indexer = Indexer::new(MockTransport::new().fail(OPS, 500), "mainnet");
        assert!(indexer.contract_operation("KT1ops", "ooA", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn contract_operation_propagates_other_statuses() {
        for status in [400, 404, 502, 503] {
            let indexer = Indexer::new(MockTransport::new().fail(OPS, status), "mainnet");
            let err = indexer.contract_operation("KT1ops", "ooA", None).await.unwrap_err();
            assert_eq!(err.status(), Some(status));
        }
    }

    #[tokio::test]
    async fn await_operation_polls_until_found() {
        let transport = MockTransport::new()
            .fail(OPS, 500)
            .route(OPS, json!({ "operations": [] }))
            .route(OPS, ops_body());
        let indexer = Indexer::new(transport, "mainnet");
        let poll = PollConfig {
            interval: Duration::from_millis(1),
            max_polls: 5,
        };

        let op = indexer.await_operation("KT1ops", "ooA", None, &poll).await.unwrap();
        assert_eq!(op.map(|o| o.hash), Some("ooA".to_string()));
        assert_eq!(indexer.transport().requests().len(), 3);
    }

    #[tokio::test]
    async fn await_operation_gives_up_after_max_polls() {
        let indexer = Indexer::new(MockTransport::new().fail(OPS, 500), "mainnet");
        let poll = PollConfig {
            interval: Duration::from_millis(1),
            max_polls: 3,
        };
        assert!(indexer.await_operation("KT1ops", "ooA", None, &poll).await.unwrap().is_none());
        assert_eq!(indexer.transport().requests().len(), 3);
    }

    #[tokio::test]
    async fn big_map_handle_uses_indexer_network() {
        let transport = MockTransport::new().route(
            "/v1/bigmap/ghostnet/3/keys",
            json!([{ "data": { "key_string": "k", "value": { "value": "v" } } }]),
        );
        let indexer = Indexer::new(transport, "ghostnet");
        let values = indexer.big_map_by_id::<String>(3).values().await.unwrap();
        assert_eq!(values[0].value, "v");
    }
}
