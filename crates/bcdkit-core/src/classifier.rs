//! Contract classification by storage shape.
//!
//! Shapes are checked in a fixed order and the first match wins:
//!
//! 1. `FA2Contract` — `ledger`, `operators` and `token_metadata` big maps all
//!    present anywhere in storage.
//! 2. `FA2FactoryContract` — the top-level storage value is a bare integer,
//!    taken as the id of the big map of created contracts. The id is not
//!    checked against the indexer.
//! 3. `GenericContract` — everything else.

use serde_json::Value;

use crate::error::IndexerError;
use crate::request::{paths, IndexerRequest};
use crate::selector::{select, Selector};
use crate::transport::IndexerTransport;
use crate::types::{BigMapId, Contract, ContractKind, ContractMetadata, Fa2BigMaps, StorageNode};

fn big_map_id(storage: &StorageNode, name: &str) -> Option<BigMapId> {
    select(storage, &Selector::big_map(name)).and_then(StorageNode::big_map_id)
}

/// Ids of the FA2 big map triple, when all three are present.
pub fn fa2_big_maps(storage: &StorageNode) -> Option<Fa2BigMaps> {
    Some(Fa2BigMaps {
        ledger: big_map_id(storage, "ledger")?,
        operators: big_map_id(storage, "operators")?,
        token_metadata: big_map_id(storage, "token_metadata")?,
    })
}

/// The top-level storage value when it is an integral JSON number.
///
/// `0` is a valid id. Strings, objects and absent values are not.
pub fn factory_big_map(storage: &StorageNode) -> Option<BigMapId> {
    match &storage.value {
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    }
}

/// Decide the contract shape from its storage tree.
pub fn classify_kind(storage: &StorageNode) -> ContractKind {
    if let Some(big_maps) = fa2_big_maps(storage) {
        return ContractKind::Fa2 { big_maps };
    }
    if let Some(contracts_big_map_id) = factory_big_map(storage) {
        return ContractKind::Fa2Factory { contracts_big_map_id };
    }
    ContractKind::Generic
}

/// Build a classified contract from already fetched parts.
pub fn classify_storage(
    address: impl Into<String>,
    manager: impl Into<String>,
    storage: StorageNode,
) -> Contract {
    let kind = classify_kind(&storage);
    Contract {
        address: address.into(),
        manager: manager.into(),
        storage,
        kind,
    }
}

/// Fetch a contract's metadata and storage, then classify it.
///
/// The two requests run one after the other. Transport errors from either
/// are returned as is.
pub async fn classify<T: IndexerTransport>(
    transport: &T,
    network: &str,
    address: &str,
) -> Result<Contract, IndexerError> {
    let metadata: ContractMetadata = transport
        .fetch(IndexerRequest::get(paths::contract(network, address)))
        .await?;
    let storage: StorageNode = transport
        .fetch(IndexerRequest::get(paths::contract_storage(network, address)))
        .await?;

    let contract = classify_storage(address, metadata.manager, storage);
    tracing::debug!(%address, network, kind = %contract.kind, "classified contract");
    Ok(contract)
}
