use std::sync::Arc;

use tokio::sync::RwLock;
use tracker_core::{AppConfig, InsightSummarizer, Tracker};

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub tracker: Arc<RwLock<Tracker>>,
    pub summarizer: Arc<InsightSummarizer>,
}

impl AppState {
    /// State backed by the configured text-generation endpoint.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let summarizer = InsightSummarizer::from_config(&config);
        Self::with_summarizer(config, summarizer)
    }

    pub fn with_summarizer(
        config: AppConfig,
        summarizer: InsightSummarizer,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let tracker = Tracker::from_config(&config)?;

        Ok(Self {
            config,
            tracker: Arc::new(RwLock::new(tracker)),
            summarizer: Arc::new(summarizer),
        })
    }
}
