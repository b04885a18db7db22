//! Series for the vision/execution charts.

use serde::{Deserialize, Serialize};
use tracker_core::SessionRecord;

/// One bar in a per-task chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPoint {
    pub task: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Vision,
    Execution,
}

/// One point in the vision-vs-execution line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    /// Zero-based position of the session in the ledger.
    pub index: usize,
    pub task: String,
    pub kind: ScoreKind,
    pub score: f64,
}

/// Everything the dashboard charts need, in ledger order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub vision_by_task: Vec<TaskPoint>,
    pub execution_by_task: Vec<TaskPoint>,
    pub scores_over_sessions: Vec<LinePoint>,
    /// Only sessions with a defined ratio appear here.
    pub ratio_by_task: Vec<TaskPoint>,
}

impl ChartSeries {
    pub fn from_records(records: &[SessionRecord]) -> Self {
        let mut series = Self::default();

        for (index, record) in records.iter().enumerate() {
            let task = record.task().to_string();

            series.vision_by_task.push(TaskPoint {
                task: task.clone(),
                value: record.vision_score(),
            });
            series.execution_by_task.push(TaskPoint {
                task: task.clone(),
                value: record.execution_score(),
            });

            series.scores_over_sessions.push(LinePoint {
                index,
                task: task.clone(),
                kind: ScoreKind::Vision,
                score: record.vision_score(),
            });
            series.scores_over_sessions.push(LinePoint {
                index,
                task: task.clone(),
                kind: ScoreKind::Execution,
                score: record.execution_score(),
            });

            if let Some(ratio) = record.ratio() {
                series.ratio_by_task.push(TaskPoint { task, value: ratio });
            }
        }

        series
    }

    pub fn is_empty(&self) -> bool {
        self.vision_by_task.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::Ledger;

    #[test]
    fn test_empty_series() {
        let series = ChartSeries::from_records(&[]);
        assert!(series.is_empty());
        assert!(series.scores_over_sessions.is_empty());
    }

    #[test]
    fn test_series_follow_ledger_order() {
        let mut ledger = Ledger::new();
        ledger.append("design", 3, 2.0, 1, 1.0).unwrap();
        ledger.append("notes", 2, 1.0, 0, 0.0).unwrap();
        ledger.append("build", 0, 0.0, 2, 2.5).unwrap();

        let series = ChartSeries::from_records(ledger.records());

        let tasks: Vec<&str> = series.vision_by_task.iter().map(|p| p.task.as_str()).collect();
        assert_eq!(tasks, vec!["design", "notes", "build"]);
        assert_eq!(series.execution_by_task[2].value, 5.0);

        // Two points (vision + execution) per session.
        assert_eq!(series.scores_over_sessions.len(), 6);
        assert_eq!(series.scores_over_sessions[2].index, 1);
        assert_eq!(series.scores_over_sessions[2].kind, ScoreKind::Vision);
        assert_eq!(series.scores_over_sessions[3].kind, ScoreKind::Execution);
    }

    #[test]
    fn test_ratio_series_skips_undefined() {
        let mut ledger = Ledger::new();
        ledger.append("design", 3, 2.0, 1, 1.0).unwrap();
        ledger.append("notes", 2, 1.0, 0, 0.0).unwrap();

        let series = ChartSeries::from_records(ledger.records());
        assert_eq!(series.ratio_by_task.len(), 1);
        assert_eq!(series.ratio_by_task[0].task, "design");
        assert_eq!(series.ratio_by_task[0].value, 6.0);
    }
}
