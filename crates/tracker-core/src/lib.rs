pub mod config;
pub mod error;
pub mod insights;
pub mod journal;
pub mod ledger;
pub mod provider;
pub mod summarizer;
pub mod tracker;
pub mod types;

pub use config::AppConfig;
pub use error::TrackerError;
pub use ledger::{
    DailyAggregate, Ledger, SessionInput, SessionRecord, DEFAULT_GOAL_HOURS, MAX_GOAL_HOURS,
};
pub use summarizer::{InsightSummarizer, SummaryResult};
pub use tracker::{Progress, Tracker};
