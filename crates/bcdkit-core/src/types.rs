//! Shared types returned by the indexer and produced by the resolver.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Identifier of a big map. Temporary big maps carry negative ids.
pub type BigMapId = i64;

// ─── StorageNode ──────────────────────────────────────────────────────────────

/// One node of a contract's storage tree as exposed by the indexer.
///
/// Leaves carry a scalar `value`; internal nodes carry `children`. Neither is
/// guaranteed, so both are optional. An explicit `"value": null` (an unset
/// option, say) is `Some(Value::Null)`, distinct from a missing `value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageNode {
    /// Type tag, e.g. `big_map`, `pair`, `nat`.
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Field annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<StorageNode>>,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

impl StorageNode {
    /// A leaf node.
    pub fn leaf(node_type: impl Into<String>, name: Option<&str>, value: Value) -> Self {
        Self {
            node_type: node_type.into(),
            name: name.map(str::to_string),
            value: Some(value),
            children: None,
        }
    }

    /// An internal node.
    pub fn branch(node_type: impl Into<String>, name: Option<&str>, children: Vec<StorageNode>) -> Self {
        Self {
            node_type: node_type.into(),
            name: name.map(str::to_string),
            value: None,
            children: Some(children),
        }
    }

    /// Children in order; empty for leaves.
    pub fn children(&self) -> &[StorageNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// The node's value as a big map id, if it is an integral JSON number.
    pub fn big_map_id(&self) -> Option<BigMapId> {
        self.value.as_ref().and_then(Value::as_i64)
    }
}

// ─── Contract ────────────────────────────────────────────────────────────────

/// Ids of the three big maps every FA2 contract stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fa2BigMaps {
    pub ledger: BigMapId,
    pub operators: BigMapId,
    pub token_metadata: BigMapId,
}

/// The recognised contract shape, serialized under `contractType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contractType")]
pub enum ContractKind {
    /// No known storage pattern matched.
    #[serde(rename = "GenericContract")]
    Generic,
    /// Storage is a bare big map id listing the contracts the factory created.
    #[serde(rename = "FA2FactoryContract", rename_all = "camelCase")]
    Fa2Factory { contracts_big_map_id: BigMapId },
    /// Storage holds `ledger`, `operators` and `token_metadata` big maps.
    #[serde(rename = "FA2Contract", rename_all = "camelCase")]
    Fa2 { big_maps: Fa2BigMaps },
}

impl ContractKind {
    /// The `contractType` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generic => "GenericContract",
            Self::Fa2Factory { .. } => "FA2FactoryContract",
            Self::Fa2 { .. } => "FA2Contract",
        }
    }
}

impl std::fmt::Display for ContractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified contract: base record plus the matched shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub address: String,
    pub manager: String,
    pub storage: StorageNode,
    #[serde(flatten)]
    pub kind: ContractKind,
}

impl Contract {
    /// Big maps of an FA2 contract.
    pub fn fa2_big_maps(&self) -> Option<&Fa2BigMaps> {
        match &self.kind {
            ContractKind::Fa2 { big_maps } => Some(big_maps),
            _ => None,
        }
    }

    /// Big map of created contracts, for a factory.
    pub fn factory_big_map(&self) -> Option<BigMapId> {
        match self.kind {
            ContractKind::Fa2Factory { contracts_big_map_id } => Some(contracts_big_map_id),
            _ => None,
        }
    }
}

/// The fields of `/v1/contract/{network}/{address}` the resolver reads.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContractMetadata {
    pub manager: String,
}

// ─── BigMapEntry ──────────────────────────────────────────────────────────────

/// One decoded key/value pair of a big map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigMapEntry<T = Value> {
    /// String form of the original key.
    pub key: String,
    pub value: T,
}

// ─── Operation ───────────────────────────────────────────────────────────────

/// Status of an operation as reported by the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Applied,
    Failed,
    Skipped,
    Backtracked,
}

impl OperationStatus {
    /// Returns `true` only for `applied`.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Read-only snapshot of a contract operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub hash: String,
    pub status: OperationStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
}

/// Body of `/v1/contract/{network}/{address}/operations`.
///
/// Entries stay raw: only the one being looked up is decoded, so an unrelated
/// entry with an unknown status or shape does not fail the lookup.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OperationsPage {
    #[serde(default)]
    pub operations: Vec<Value>,
}

impl OperationsPage {
    /// Decode the first entry whose `hash` is `hash`.
    pub fn find(self, hash: &str) -> Result<Option<Operation>, serde_json::Error> {
        self.operations
            .into_iter()
            .find(|op| op.get("hash").and_then(Value::as_str) == Some(hash))
            .map(serde_json::from_value)
            .transpose()
    }
}

// ─── NetworkStats ─────────────────────────────────────────────────────────────

/// Head snapshot for one network served by the indexer.
///
/// Read from `chain_id`, written as `chainId` followed by the untouched
/// `chain_id`. Fields not listed here are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkStats {
    pub chain_id: String,
    pub hash: String,
    pub level: i64,
    pub network: String,
    pub predecessor: String,
    pub protocol: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Serialize for NetworkStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("chainId", &self.chain_id)?;
        map.serialize_entry("chain_id", &self.chain_id)?;
        map.serialize_entry("hash", &self.hash)?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("network", &self.network)?;
        map.serialize_entry("predecessor", &self.predecessor)?;
        map.serialize_entry("protocol", &self.protocol)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        // A re-read `chainId` lands in `extra`; it is already written above.
        for (key, value) in self.extra.iter().filter(|(key, _)| key.as_str() != "chainId") {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
