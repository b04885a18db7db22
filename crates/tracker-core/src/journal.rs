use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::ledger::goal_reached;

/// One end-of-day reflection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionEntry {
    pub date: DateTime<Utc>,
    pub text: String,
}

impl ReflectionEntry {
    /// Minute-resolution label, e.g. `2024-05-01 18:30`.
    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Append-only reflection journal, unlocked once the daily goal is reached.
#[derive(Debug, Default)]
pub struct ReflectionJournal {
    entries: Vec<ReflectionEntry>,
}

impl ReflectionJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reflection given the current progress fraction.
    ///
    /// Blank text is rejected before the goal gate is checked.
    pub fn append(&mut self, text: &str, progress_fraction: f64) -> Result<ReflectionEntry> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TrackerError::EmptyReflection);
        }
        if !goal_reached(progress_fraction) {
            return Err(TrackerError::GoalNotReached {
                progress: progress_fraction,
            });
        }

        let entry = ReflectionEntry {
            date: Utc::now(),
            text: text.to_string(),
        };
        tracing::info!(chars = entry.text.len(), "Reflection saved");
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Entries, newest first.
    pub fn list(&self) -> Vec<ReflectionEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_until_goal_reached() {
        let mut journal = ReflectionJournal::new();
        let err = journal.append("learned a lot", 0.4).unwrap_err();
        assert!(matches!(err, TrackerError::GoalNotReached { .. }));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_records_trimmed_text_when_goal_reached() {
        let mut journal = ReflectionJournal::new();
        let entry = journal.append("  shipped early, plan less  \n", 1.0).unwrap();
        assert_eq!(entry.text, "shipped early, plan less");
        assert_eq!(journal.list()[0].text, "shipped early, plan less");
    }

    #[test]
    fn test_blank_reflection_rejected() {
        let mut journal = ReflectionJournal::new();
        assert!(matches!(
            journal.append("   \n\t", 1.0),
            Err(TrackerError::EmptyReflection)
        ));
        // Blank text is reported even while the journal is locked.
        assert!(matches!(
            journal.append("", 0.2),
            Err(TrackerError::EmptyReflection)
        ));
    }

    #[test]
    fn test_list_newest_first_and_stable() {
        let mut journal = ReflectionJournal::new();
        journal.append("first", 1.0).unwrap();
        journal.append("second", 1.0).unwrap();

        let listed = journal.list();
        assert_eq!(listed[0].text, "second");
        assert_eq!(listed[1].text, "first");
        assert_eq!(journal.list(), listed);
    }

    #[test]
    fn test_date_label_format() {
        let entry = ReflectionEntry {
            date: DateTime::parse_from_rfc3339("2024-05-01T18:30:59Z")
                .unwrap()
                .with_timezone(&Utc),
            text: "ok".into(),
        };
        assert_eq!(entry.date_label(), "2024-05-01 18:30");
    }
}
