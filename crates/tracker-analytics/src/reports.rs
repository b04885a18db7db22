//! Markdown report generation for a tracking day.

use chrono::Utc;
use tracker_core::ledger::completed_hours;
use tracker_core::MAX_GOAL_HOURS;
use tracker_core::{DailyAggregate, Tracker, TrackerError};

const DONE_BLOCK: &str = "🟩";
const OPEN_BLOCK: &str = "⬜";

/// Report generator for creating markdown summaries.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Generate the end-of-day report for everything the tracker holds.
    pub fn daily_report(tracker: &Tracker) -> Result<String, TrackerError> {
        let mut report = String::new();

        report.push_str(&format!(
            "# Daily Report\n\n**{}**\n\n",
            Utc::now().format("%B %d, %Y")
        ));

        match tracker.aggregate() {
            Ok(aggregate) => {
                report.push_str(&Self::summary_section(&aggregate));
                report.push_str(&Self::session_table(tracker));
            }
            Err(TrackerError::EmptyLedger) => {
                report.push_str("## Daily Summary\n\nNo sessions logged yet.\n\n");
            }
            Err(e) => return Err(e),
        }

        let progress = tracker.progress()?;
        report.push_str(&format!(
            "## {}-Hour Daily Progress\n\n",
            progress.goal_hours
        ));
        report.push_str(&format!(
            "Hourly Progress: {}\n\n",
            hourly_blocks(progress.fraction, progress.goal_hours)
        ));
        report.push_str(&format!(
            "Progress toward {}-hour goal: {:.1}%\n\n",
            progress.goal_hours,
            progress.fraction * 100.0
        ));

        let reflections = tracker.list_reflections();
        if !reflections.is_empty() {
            report.push_str("## Reflections\n\n");
            for entry in &reflections {
                report.push_str(&format!("**{}**: {}\n\n", entry.date_label(), entry.text));
            }
        }

        let insights = tracker.list_insights();
        if !insights.is_empty() {
            report.push_str("## Logged Insights\n\n");
            for (i, line) in insights.iter().enumerate() {
                report.push_str(&format!("{}. {}\n", i + 1, line));
            }
            report.push('\n');
        }

        tracing::debug!(bytes = report.len(), "Daily report rendered");
        Ok(report)
    }

    /// Totals and the average ratio, formatted for display.
    pub fn summary_section(aggregate: &DailyAggregate) -> String {
        let mut section = String::from("## Daily Summary\n\n");
        section.push_str(&format!(
            "- **Total Vision Score:** {}\n",
            aggregate.total_vision
        ));
        section.push_str(&format!(
            "- **Total Execution Score:** {}\n",
            aggregate.total_execution
        ));
        section.push_str(&format!(
            "- **Total Weighted Productivity Score:** {}\n",
            aggregate.total_score
        ));
        section.push_str(&format!(
            "- **Average Vision-to-Execution Ratio:** {}\n\n",
            format_ratio(aggregate.average_ratio)
        ));
        section
    }

    fn session_table(tracker: &Tracker) -> String {
        let mut table = String::from("## Session Log\n\n");
        table.push_str("| Task | Vision | Execution | Total | Ratio | Logged |\n");
        table.push_str("|------|--------|-----------|-------|-------|--------|\n");
        for record in tracker.sessions() {
            table.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                if record.task().is_empty() { "-" } else { record.task() },
                record.vision_score(),
                record.execution_score(),
                record.total_score(),
                format_ratio(record.ratio()),
                record.timestamp().format("%H:%M"),
            ));
        }
        table.push('\n');
        table
    }
}

/// Ratio to two decimals, or `n/a` when undefined.
pub fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.2}", r),
        None => "n/a".to_string(),
    }
}

/// One block per goal unit, filled for each completed unit.
///
/// Never draws more than [`MAX_GOAL_HOURS`] blocks.
pub fn hourly_blocks(progress_fraction: f64, goal_hours: f64) -> String {
    let total = goal_hours.ceil().clamp(0.0, MAX_GOAL_HOURS) as usize;
    let done = (completed_hours(progress_fraction, goal_hours) as usize).min(total);
    let mut blocks = DONE_BLOCK.repeat(done);
    blocks.push_str(&OPEN_BLOCK.repeat(total - done));
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::SessionInput;

    fn session(task: &str, insights: u64, value: f64, shipped: u64, weight: f64) -> SessionInput {
        SessionInput {
            task: task.into(),
            insights_count: insights,
            insight_value: value,
            products_shipped: shipped,
            weight,
        }
    }

    #[test]
    fn test_hourly_blocks() {
        assert_eq!(hourly_blocks(0.0, 10.0), "⬜".repeat(10));
        assert_eq!(hourly_blocks(0.45, 10.0), format!("{}{}", "🟩".repeat(4), "⬜".repeat(6)));
        assert_eq!(hourly_blocks(1.0, 10.0), "🟩".repeat(10));
    }

    #[test]
    fn test_hourly_blocks_capped_for_huge_goal() {
        assert_eq!(hourly_blocks(0.0, 1e19), "⬜".repeat(24));
        assert_eq!(hourly_blocks(1.0, 1e19), "🟩".repeat(24));
        assert_eq!(hourly_blocks(0.5, f64::NAN), "");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(Some(1.126)), "1.13");
        assert_eq!(format_ratio(None), "n/a");
    }

    #[test]
    fn test_empty_report() {
        let tracker = Tracker::default();
        let report = ReportGenerator::daily_report(&tracker).unwrap();
        assert!(report.contains("# Daily Report"));
        assert!(report.contains("No sessions logged yet."));
        assert!(report.contains("Progress toward 10-hour goal: 0.0%"));
        assert!(!report.contains("## Reflections"));
    }

    #[test]
    fn test_report_with_sessions_and_reflection() {
        let mut tracker = Tracker::default();
        tracker.append_session(session("draft", 2, 2.0, 1, 2.0)).unwrap();
        tracker.append_session(session("", 2, 1.0, 0, 0.0)).unwrap();
        tracker.append_session(session("ship", 0, 0.0, 2, 1.0)).unwrap();
        tracker.append_reflection("stayed focused").unwrap();
        tracker.record_insights(&["less context switching"]).unwrap();

        let report = ReportGenerator::daily_report(&tracker).unwrap();
        assert!(report.contains("- **Total Vision Score:** 6\n"));
        assert!(report.contains("- **Total Execution Score:** 4\n"));
        assert!(report.contains("- **Total Weighted Productivity Score:** 10\n"));
        // Mean of 2.0 and 0.0; the middle session has no ratio.
        assert!(report.contains("Average Vision-to-Execution Ratio:** 1.00"));
        assert!(report.contains("| draft | 4 | 2 | 6 | 2.00 |"));
        assert!(report.contains("| - | 2 | 0 | 2 | n/a |"));
        assert!(report.contains("Progress toward 10-hour goal: 100.0%"));
        assert!(report.contains(": stayed focused"));
        assert!(report.contains("1. less context switching"));
    }

    #[test]
    fn test_summary_section_without_ratio() {
        let aggregate = DailyAggregate {
            session_count: 1,
            total_vision: 3.5,
            total_execution: 0.0,
            total_score: 3.5,
            average_ratio: None,
            defined_ratio_count: 0,
        };
        let section = ReportGenerator::summary_section(&aggregate);
        assert!(section.contains("Total Vision Score:** 3.5"));
        assert!(section.contains("Average Vision-to-Execution Ratio:** n/a"));
    }
}
