//! Big map key listing and value decoding.
//!
//! The indexer returns every key of a big map as
//! `{ data: { key_string, value: { value?, children? } } }`. A value with a
//! scalar `value` decodes to that scalar; otherwise its `children` are folded
//! into a plain JSON object keyed by field name, recursively.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::IndexerError;
use crate::request::{paths, IndexerRequest};
use crate::transport::IndexerTransport;
use crate::types::{BigMapEntry, BigMapId, StorageNode};

/// One item of `/v1/bigmap/{network}/{id}/keys`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBigMapItem {
    pub data: RawBigMapData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBigMapData {
    pub key_string: String,
    /// `null` for keys that were removed from the big map.
    #[serde(default)]
    pub value: Option<StorageNode>,
}

/// Decode a node: its scalar value if present, else its flattened children.
pub fn decode_node(node: &StorageNode) -> Value {
    match &node.value {
        Some(value) => value.clone(),
        None => flatten_children(node.children()),
    }
}

/// Fold children into an object keyed by `name`.
///
/// Keys follow child order. Unnamed children are keyed by their position. A
/// repeated name keeps its first position and the last value.
pub fn flatten_children(children: &[StorageNode]) -> Value {
    let mut map = Map::new();
    for (i, child) in children.iter().enumerate() {
        let key = child.name.clone().unwrap_or_else(|| i.to_string());
        map.insert(key, decode_node(child));
    }
    Value::Object(map)
}

/// Decode one raw key listing item into an untyped entry.
pub fn decode_item(item: &RawBigMapItem) -> BigMapEntry<Value> {
    BigMapEntry {
        key: item.data.key_string.clone(),
        value: item.data.value.as_ref().map_or(Value::Null, decode_node),
    }
}

/// Handle on a single big map. Nothing is fetched until [`BigMap::values`].
pub struct BigMap<'a, T, V = Value> {
    transport: &'a T,
    network: String,
    id: BigMapId,
    _value: PhantomData<fn() -> V>,
}

impl<'a, T: IndexerTransport, V: DeserializeOwned> BigMap<'a, T, V> {
    pub fn new(transport: &'a T, network: impl Into<String>, id: BigMapId) -> Self {
        Self {
            transport,
            network: network.into(),
            id,
            _value: PhantomData,
        }
    }

    pub fn id(&self) -> BigMapId {
        self.id
    }

    /// Fetch every key of the big map, in the order the indexer lists them.
    pub async fn values(&self) -> Result<Vec<BigMapEntry<V>>, IndexerError> {
        let req = IndexerRequest::get(paths::big_map_keys(&self.network, self.id));
        let items: Vec<RawBigMapItem> = self.transport.fetch(req).await?;
        tracing::debug!(big_map = self.id, keys = items.len(), "fetched big map keys");

        items
            .iter()
            .map(|item| -> Result<BigMapEntry<V>, IndexerError> {
                let entry = decode_item(item);
                Ok(BigMapEntry {
                    key: entry.key,
                    value: serde_json::from_value(entry.value)?,
                })
            })
            .collect()
    }
}
