use async_trait::async_trait;
use http::StatusCode;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Submission request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Transport error: {0}")]
    Other(String),
}

/// The network seam of the form controller. The controller only cares about
/// the response status; bodies are not consumed.
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> Result<StatusCode, TransportError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        HttpTransport { client }
    }
}

#[async_trait]
impl SubmitTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<StatusCode, TransportError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        Ok(response.status())
    }
}
