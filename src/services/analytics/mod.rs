use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

mod mixpanel;
mod mock;

pub use mixpanel::{MixpanelConfig, MixpanelSink};
#[allow(unused_imports)]
pub use mock::{MockSink, RecordedEvent};

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Analytics request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Analytics API responded with status {status}: {message}")]
    Api {
        status: http::StatusCode,
        message: String,
    },
    #[error("Analytics project token is not set")]
    MissingToken,
    #[error("Analytics error: {0}")]
    Other(String),
}

/// A write-only event sink. Construction is initialization; `shutdown` is the
/// explicit flush point before process exit. Implementations must be safe to
/// share across tasks.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn track(
        &self,
        event: &str,
        properties: Option<Map<String, Value>>,
    ) -> Result<(), AnalyticsError>;

    async fn shutdown(&self) -> Result<(), AnalyticsError> {
        Ok(())
    }
}

/// Fire-and-forget emission. Sink failures degrade to a warning; the caller's
/// primary flow never observes them.
pub async fn emit(sink: &dyn AnalyticsSink, event: &str, properties: Option<Map<String, Value>>) {
    if let Err(err) = sink.track(event, properties).await {
        tracing::warn!(%err, event, "analytics emission failed");
    }
}
