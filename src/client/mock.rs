use crate::client::transport::{SubmitTransport, TransportError};
use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use std::sync::Mutex;

/// A mock transport that records submitted bodies for testing purposes.
#[derive(Debug)]
pub struct MockTransport {
    pub requests: Mutex<Vec<(String, Value)>>,
    pub respond_with: Option<StatusCode>,
}

impl Default for MockTransport {
    fn default() -> Self {
        MockTransport {
            requests: Mutex::new(Vec::new()),
            respond_with: Some(StatusCode::OK),
        }
    }
}

impl MockTransport {
    pub fn responding(status: StatusCode) -> Self {
        MockTransport {
            respond_with: Some(status),
            ..Default::default()
        }
    }

    /// Simulates a transport-level failure: no response at all.
    pub fn unreachable() -> Self {
        MockTransport {
            respond_with: None,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SubmitTransport for MockTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<StatusCode, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        match self.respond_with {
            Some(status) => Ok(status),
            None => Err(TransportError::Other("connection refused".into())),
        }
    }
}
