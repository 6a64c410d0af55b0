//! The `IndexerTransport` trait — the seam between the resolver and the network.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::IndexerError;
use crate::request::IndexerRequest;

/// Async transport that executes GET requests against an indexer.
///
/// Implementations own the retry policy: `send` is expected to retry
/// transient failures up to the transport's default budget, or up to
/// [`IndexerRequest::max_retries`] when the request carries an override.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
#[async_trait]
pub trait IndexerTransport: Send + Sync + 'static {
    /// Execute the request and return the decoded JSON body.
    async fn send(&self, req: IndexerRequest) -> Result<Value, IndexerError>;

    /// Return the base URL requests are resolved against.
    fn base_url(&self) -> &str;

    /// Convenience: send a request and deserialize the body into `T`.
    async fn fetch<T: DeserializeOwned>(&self, req: IndexerRequest) -> Result<T, IndexerError>
    where
        Self: Sized,
    {
        let body = self.send(req).await?;
        serde_json::from_value(body).map_err(IndexerError::Deserialization)
    }
}
