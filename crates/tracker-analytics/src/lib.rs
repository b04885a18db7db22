//! Chart series and reporting for vision-tracker sessions.
//!
//! Derives per-task and per-session series for vision/execution charts and
//! renders the daily summary as markdown.

pub mod charts;
pub mod reports;

pub use charts::{ChartSeries, LinePoint, ScoreKind, TaskPoint};
pub use reports::{hourly_blocks, ReportGenerator};
