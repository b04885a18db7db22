use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::Result;
use crate::insights::InsightLog;
use crate::journal::{ReflectionEntry, ReflectionJournal};
use crate::ledger::{
    completed_hours, goal_reached, progress_fraction, DailyAggregate, Ledger, SessionInput,
    SessionRecord,
};
use crate::summarizer::{InsightBatch, InsightSummarizer, SummaryResult};

/// Progress toward the daily goal at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub total_score: f64,
    pub goal_hours: f64,
    pub fraction: f64,
    pub completed_hours: u32,
    pub goal_reached: bool,
}

/// All state for one tracking day, owned by whichever front end is running.
#[derive(Debug)]
pub struct Tracker {
    ledger: Ledger,
    journal: ReflectionJournal,
    insights: InsightLog,
    goal_hours: f64,
}

impl Tracker {
    pub fn new(goal_hours: f64) -> Result<Self> {
        // Reject a bad goal up front rather than on every progress query.
        progress_fraction(0.0, goal_hours)?;
        Ok(Self {
            ledger: Ledger::new(),
            journal: ReflectionJournal::new(),
            insights: InsightLog::new(),
            goal_hours,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.goal.hours)
    }

    pub fn goal_hours(&self) -> f64 {
        self.goal_hours
    }

    pub fn append_session(&mut self, input: SessionInput) -> Result<SessionRecord> {
        self.ledger.append_input(input)
    }

    /// Sessions in the order they were logged.
    pub fn sessions(&self) -> &[SessionRecord] {
        self.ledger.records()
    }

    pub fn aggregate(&self) -> Result<DailyAggregate> {
        self.ledger.aggregate()
    }

    /// Current progress; an empty ledger counts as no progress.
    pub fn progress(&self) -> Result<Progress> {
        let total_score = self.ledger.total_score();
        let fraction = progress_fraction(total_score, self.goal_hours)?;
        Ok(Progress {
            total_score,
            goal_hours: self.goal_hours,
            fraction,
            completed_hours: completed_hours(fraction, self.goal_hours),
            goal_reached: goal_reached(fraction),
        })
    }

    pub fn goal_reached(&self) -> Result<bool> {
        Ok(self.progress()?.goal_reached)
    }

    /// Save a reflection if the goal has been reached.
    pub fn append_reflection(&mut self, text: &str) -> Result<ReflectionEntry> {
        let fraction = self.progress()?.fraction;
        self.journal.append(text, fraction)
    }

    /// Reflections, newest first.
    pub fn list_reflections(&self) -> Vec<ReflectionEntry> {
        self.journal.list()
    }

    /// Validate and log a batch of insights without summarizing it.
    ///
    /// Lets callers release their hold on the tracker before the network call.
    pub fn record_insights<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<InsightBatch> {
        let batch = InsightBatch::new(lines)?;
        self.insights.extend(batch.lines().iter().cloned());
        Ok(batch)
    }

    /// Log a batch of insights and summarize it.
    pub async fn submit_insights<S: AsRef<str>>(
        &mut self,
        summarizer: &InsightSummarizer,
        lines: &[S],
    ) -> Result<SummaryResult> {
        summarizer.submit(&mut self.insights, lines).await
    }

    /// Insight lines, newest first.
    pub fn list_insights(&self) -> Vec<String> {
        self.insights.list()
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            ledger: Ledger::new(),
            journal: ReflectionJournal::new(),
            insights: InsightLog::new(),
            goal_hours: crate::ledger::DEFAULT_GOAL_HOURS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::summarizer::tests::ScriptedGenerator;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn input(task: &str, insights: u64, value: f64, shipped: u64, weight: f64) -> SessionInput {
        SessionInput {
            task: task.into(),
            insights_count: insights,
            insight_value: value,
            products_shipped: shipped,
            weight,
        }
    }

    #[test]
    fn test_rejects_out_of_range_goal() {
        assert!(matches!(
            Tracker::new(0.0),
            Err(TrackerError::InvalidConfig(_))
        ));
        assert!(Tracker::new(-1.0).is_err());
        assert!(matches!(
            Tracker::new(1e19),
            Err(TrackerError::InvalidConfig(_))
        ));
        assert!(Tracker::new(24.0).is_ok());
    }

    #[test]
    fn test_empty_tracker_has_zero_progress() {
        let tracker = Tracker::default();
        let progress = tracker.progress().unwrap();
        assert_eq!(progress.fraction, 0.0);
        assert_eq!(progress.completed_hours, 0);
        assert!(!progress.goal_reached);
        assert!(matches!(tracker.aggregate(), Err(TrackerError::EmptyLedger)));
    }

    #[test]
    fn test_progress_tracks_total_score() {
        let mut tracker = Tracker::default();
        tracker.append_session(input("plan", 2, 1.0, 1, 2.0)).unwrap();

        let progress = tracker.progress().unwrap();
        assert!((progress.fraction - 0.4).abs() < 1e-9);
        assert_eq!(progress.completed_hours, 4);
        assert!(!tracker.goal_reached().unwrap());

        tracker.append_session(input("ship", 0, 0.0, 4, 2.0)).unwrap();
        let progress = tracker.progress().unwrap();
        assert_eq!(progress.fraction, 1.0);
        assert_eq!(progress.completed_hours, 10);
        assert!(progress.goal_reached);
    }

    #[test]
    fn test_reflection_gated_on_goal() {
        let mut tracker = Tracker::default();
        tracker.append_session(input("warmup", 4, 1.0, 0, 0.0)).unwrap();

        let err = tracker.append_reflection("good day").unwrap_err();
        assert!(matches!(err, TrackerError::GoalNotReached { .. }));
        assert!(tracker.list_reflections().is_empty());

        tracker.append_session(input("deep work", 0, 0.0, 3, 3.0)).unwrap();
        let entry = tracker.append_reflection("  good day  ").unwrap();
        assert_eq!(entry.text, "good day");
        assert_eq!(tracker.list_reflections(), vec![entry]);
    }

    #[test]
    fn test_custom_goal_changes_threshold() {
        let mut tracker = Tracker::new(4.0).unwrap();
        tracker.append_session(input("short day", 4, 1.0, 0, 0.0)).unwrap();
        assert!(tracker.goal_reached().unwrap());
        assert!(tracker.append_reflection("done early").is_ok());
    }

    #[test]
    fn test_record_insights_appends_in_order() {
        let mut tracker = Tracker::default();
        let batch = tracker.record_insights(&["a", " ", "b"]).unwrap();
        assert_eq!(batch.lines().len(), 2);
        assert_eq!(tracker.list_insights(), vec!["b", "a"]);

        assert!(matches!(
            tracker.record_insights(&[""]),
            Err(TrackerError::EmptyInsightBatch)
        ));
        assert_eq!(tracker.list_insights().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_insights_through_tracker() {
        let generator = Arc::new(ScriptedGenerator::failing("network down"));
        let summarizer = InsightSummarizer::new(generator.clone(), &AppConfig::default());
        let mut tracker = Tracker::default();

        let result = tracker
            .submit_insights(&summarizer, &["a", "b"])
            .await
            .unwrap();
        assert!(!result.is_completed());
        assert_eq!(tracker.list_insights(), vec!["b", "a"]);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

        // Ledger is untouched by summaries.
        assert!(tracker.sessions().is_empty());
    }
}
