//! In-memory transport for offline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::IndexerError;
use crate::request::IndexerRequest;
use crate::transport::IndexerTransport;

#[derive(Debug, Clone)]
enum Reply {
    Body(Value),
    Status(u16),
}

/// Serves canned replies by path. Replies queued for a path are consumed in
/// order; the last one is repeated.
#[derive(Default)]
pub(crate) struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<IndexerRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, body: Value) -> Self {
        self.push(path, Reply::Body(body));
        self
    }

    pub fn fail(self, path: &str, status: u16) -> Self {
        self.push(path, Reply::Status(status));
        self
    }

    pub fn requests(&self) -> Vec<IndexerRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl IndexerTransport for MockTransport {
    async fn send(&self, req: IndexerRequest) -> Result<Value, IndexerError> {
        self.requests.lock().unwrap().push(req.clone());

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            let queue = replies
                .get_mut(&req.path)
                .ok_or_else(|| IndexerError::Status {
                    status: 404,
                    url: req.path.clone(),
                    body: "no route".into(),
                })?;
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        };

        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(IndexerError::Status {
                status,
                url: req.path,
                body: String::new(),
            }),
            None => Err(IndexerError::Other(format!("no reply queued for {}", req.path))),
        }
    }

    fn base_url(&self) -> &str {
        "mock://indexer"
    }
}
