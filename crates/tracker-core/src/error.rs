use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("No sessions logged yet")]
    EmptyLedger,

    #[error("Daily goal not reached yet ({:.1}% complete)", .progress * 100.0)]
    GoalNotReached { progress: f64 },

    #[error("Reflection is empty, write something before saving")]
    EmptyReflection,

    #[error("Enter at least one insight before submitting")]
    EmptyInsightBatch,

    #[error("Summary request failed: {0}")]
    ExternalCallFailure(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl TrackerError {
    /// True for conditions caused by what the user typed or the state they
    /// are in, as opposed to configuration or infrastructure problems.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            TrackerError::InvalidInput(_)
                | TrackerError::EmptyLedger
                | TrackerError::GoalNotReached { .. }
                | TrackerError::EmptyReflection
                | TrackerError::EmptyInsightBatch
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_not_reached_message_shows_percentage() {
        let err = TrackerError::GoalNotReached { progress: 0.4 };
        assert_eq!(err.to_string(), "Daily goal not reached yet (40.0% complete)");
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(TrackerError::EmptyReflection.is_user_facing());
        assert!(TrackerError::InvalidInput("weight".into()).is_user_facing());
        assert!(!TrackerError::InvalidConfig("goal".into()).is_user_facing());
        assert!(!TrackerError::ExternalCallFailure("quota".into()).is_user_facing());
    }
}
