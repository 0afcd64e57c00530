use crate::services::analytics::{AnalyticsError, AnalyticsSink};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub name: String,
    pub properties: Option<Map<String, Value>>,
}

/// A mock sink that records tracked events for testing purposes.
#[derive(Debug, Default)]
pub struct MockSink {
    pub recorded: Mutex<Vec<RecordedEvent>>,
    pub shutdown_calls: AtomicUsize,
    pub fail_track: bool,
}

impl MockSink {
    pub fn event_names(&self) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.name.clone())
            .collect()
    }

    pub fn events_named(&self, name: &str) -> Vec<RecordedEvent> {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.name == name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AnalyticsSink for MockSink {
    async fn track(
        &self,
        event: &str,
        properties: Option<Map<String, Value>>,
    ) -> Result<(), AnalyticsError> {
        if self.fail_track {
            return Err(AnalyticsError::Other("mock failure".into()));
        }
        self.recorded.lock().unwrap().push(RecordedEvent {
            name: event.to_string(),
            properties,
        });
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), AnalyticsError> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
