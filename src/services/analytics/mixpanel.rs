use crate::services::analytics::{AnalyticsError, AnalyticsSink};
use async_trait::async_trait;
use http::StatusCode;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use time::OffsetDateTime;
use tracing::info;

pub const MIXPANEL_BASE_URL: &str = "https://api.mixpanel.com";

#[derive(Debug, Clone)]
pub struct MixpanelConfig {
    pub token: String,
    /// Track even when the page signaled do-not-track. Mirrors the browser
    /// client's `ignore_dnt` option.
    pub ignore_do_not_track: bool,
    pub base_url: String,
}

impl MixpanelConfig {
    pub fn new(token: impl Into<String>) -> Self {
        MixpanelConfig {
            token: token.into(),
            ignore_do_not_track: true,
            base_url: MIXPANEL_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IngestionResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP ingestion client for the Mixpanel /track endpoint.
#[derive(Debug)]
pub struct MixpanelSink {
    client: Client,
    config: MixpanelConfig,
    /// Whether the surrounding page/environment requested do-not-track.
    /// Decided once at construction, honored unless the config ignores it.
    do_not_track_requested: bool,
}

impl MixpanelSink {
    pub fn new(
        client: Client,
        config: MixpanelConfig,
        do_not_track_requested: bool,
    ) -> Result<Self, AnalyticsError> {
        if config.token.trim().is_empty() {
            return Err(AnalyticsError::MissingToken);
        }
        info!("analytics client initialized");
        Ok(MixpanelSink {
            client,
            config,
            do_not_track_requested,
        })
    }

    fn tracking_enabled(&self) -> bool {
        self.config.ignore_do_not_track || !self.do_not_track_requested
    }

    fn track_url(&self) -> String {
        format!(
            "{}/track?verbose=1",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl AnalyticsSink for MixpanelSink {
    async fn track(
        &self,
        event: &str,
        properties: Option<Map<String, Value>>,
    ) -> Result<(), AnalyticsError> {
        if !self.tracking_enabled() {
            return Ok(());
        }

        let mut properties = properties.unwrap_or_default();
        properties.insert("token".into(), Value::String(self.config.token.clone()));
        properties.insert(
            "time".into(),
            json!(OffsetDateTime::now_utc().unix_timestamp()),
        );
        properties.insert(
            "$insert_id".into(),
            Value::String(uuid::Uuid::new_v4().to_string()),
        );

        let body = json!([{ "event": event, "properties": properties }]);

        let response = self
            .client
            .post(self.track_url())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "text/plain")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AnalyticsError::Api {
                status,
                message: text,
            });
        }

        let parsed = serde_json::from_str::<IngestionResponse>(&text).ok();
        if let Some(parsed) = parsed {
            if parsed.status != 1 {
                return Err(AnalyticsError::Api {
                    status: StatusCode::OK,
                    message: parsed.error.unwrap_or_else(|| "event not accepted".into()),
                });
            }
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), AnalyticsError> {
        // Events are delivered per call; nothing buffered to flush.
        info!("analytics client shut down");
        Ok(())
    }
}
