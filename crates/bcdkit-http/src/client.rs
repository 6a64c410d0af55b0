//! HTTP indexer transport backed by `reqwest`.
//!
//! Every request is retried with exponential backoff on transient errors
//! (network failures, timeouts, `429`, `5xx`). The retry budget comes from
//! [`HttpClientConfig::retry`] unless the request carries its own
//! `max_retries`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use bcdkit_core::error::IndexerError;
use bcdkit_core::policy::{RetryConfig, RetryPolicy};
use bcdkit_core::request::IndexerRequest;
use bcdkit_core::transport::IndexerTransport;

/// Configuration for `HttpIndexerClient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub retry: RetryConfig,
    #[serde(with = "secs")]
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("bcdkit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Indexer transport over HTTP with built-in retry.
pub struct HttpIndexerClient {
    base_url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
    request_timeout: Duration,
}

impl HttpIndexerClient {
    /// Create a client for the indexer API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, config: HttpClientConfig) -> Result<Self, IndexerError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| IndexerError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            retry: RetryPolicy::new(config.retry),
            request_timeout: config.request_timeout,
        })
    }

    /// Create with default configuration.
    pub fn default_for(base_url: impl Into<String>) -> Result<Self, IndexerError> {
        Self::new(base_url, HttpClientConfig::default())
    }

    /// Absolute URL of `path`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_once(&self, req: &IndexerRequest) -> Result<Value, IndexerError> {
        let url = self.url_for(&req.path);
        tracing::debug!(%url, query = ?req.query, "GET");

        let resp = self
            .http
            .get(&url)
            .query(&req.query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(IndexerError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }

        serde_json::from_str(&body).map_err(IndexerError::Deserialization)
    }

    fn transport_error(&self, e: reqwest::Error) -> IndexerError {
        if e.is_timeout() {
            IndexerError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            IndexerError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl IndexerTransport for HttpIndexerClient {
    async fn send(&self, req: IndexerRequest) -> Result<Value, IndexerError> {
        let retry = match req.max_retries {
            Some(max_retries) => self.retry.with_max_retries(max_retries),
            None => self.retry.clone(),
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send_once(&req).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() => match retry.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            path = %req.path,
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        if retry.config.max_retries > 0 {
                            tracing::error!(
                                attempt,
                                error = %e,
                                path = %req.path,
                                "max retries exceeded"
                            );
                        }
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
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

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = HttpIndexerClient::default_for("https://api.example.com/").unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.url_for("/v1/stats"), "https://api.example.com/v1/stats");
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: HttpClientConfig =
            serde_json::from_str(r#"{"request_timeout": 5, "retry": {"max_retries": 1}}"#).unwrap();
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        assert_eq!(cfg.retry.max_retries, 1);
        assert!(cfg.user_agent.starts_with("bcdkit/"));
    }
}
