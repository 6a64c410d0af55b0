//! bcdkit-http — `reqwest` transport and network profiles for bcdkit.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), bcdkit_core::IndexerError> {
//! let indexer = bcdkit_http::better_call_dev("mainnet")?;
//! let contract = indexer.contract_by_address("KT1RJ6PbjHpwc3M5rw5s2Nbmefwbuwbdxton").await?;
//! println!("{}", contract.kind);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod networks;

pub use client::{HttpClientConfig, HttpIndexerClient};
pub use networks::{better_call_dev, IndexerConfig, BETTER_CALL_DEV_API};

/// An [`bcdkit_core::Indexer`] over HTTP.
pub type BetterCallDev = bcdkit_core::Indexer<HttpIndexerClient>;
