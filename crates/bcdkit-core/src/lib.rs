//! bcdkit-core — contract classification and big map decoding for
//! Better Call Dev style indexers.
//!
//! # Overview
//!
//! - [`selector`] — depth-first search of a storage tree by type tag and name
//! - [`bigmap`] — big map key listing and recursive value flattening
//! - [`classifier`] — FA2 / FA2 factory / generic contract detection
//! - [`Indexer`] — façade over an [`IndexerTransport`]
//! - [`policy`] — retry policy shared by transports
//! - [`IndexerError`] — structured error type

pub mod bigmap;
pub mod classifier;
pub mod error;
pub mod indexer;
pub mod policy;
pub mod request;
pub mod selector;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use bigmap::BigMap;
pub use error::IndexerError;
pub use indexer::{Indexer, PollConfig};
pub use request::IndexerRequest;
pub use selector::{select, Selector};
pub use transport::IndexerTransport;
pub use types::{
    BigMapEntry, BigMapId, Contract, ContractKind, Fa2BigMaps, NetworkStats, Operation,
    OperationStatus, StorageNode,
};
