use crate::config::Config;
use crate::services::analytics::AnalyticsSink;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub analytics: Arc<dyn AnalyticsSink>,
    pub config: Arc<Config>,
}
