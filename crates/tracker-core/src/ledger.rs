//! Session ledger: append-only log of work sessions with derived scores.
//!
//! Each record carries a vision score (insights x value per insight), an
//! execution score (products shipped x weight per product), their total, and
//! the vision-to-execution ratio when execution is non-zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TrackerError};

/// Total score that fills the daily progress bar. The tracker time-boxes a
/// day against a fixed 10-unit scale.
pub const DEFAULT_GOAL_HOURS: f64 = 10.0;

/// Largest accepted daily goal; one day's worth of hours.
pub const MAX_GOAL_HOURS: f64 = 24.0;

/// A single logged session. Derived fields are computed once at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    id: String,
    task: String,
    insights_count: u64,
    insight_value: f64,
    products_shipped: u64,
    weight: f64,
    vision_score: f64,
    execution_score: f64,
    total_score: f64,
    ratio: Option<f64>,
    timestamp: DateTime<Utc>,
}

impl SessionRecord {
    fn new(input: SessionInput, timestamp: DateTime<Utc>) -> Result<Self> {
        check_non_negative("insight_value", input.insight_value)?;
        check_non_negative("weight", input.weight)?;

        let vision_score = input.insights_count as f64 * input.insight_value;
        let execution_score = input.products_shipped as f64 * input.weight;
        let total_score = vision_score + execution_score;
        if !total_score.is_finite() {
            return Err(TrackerError::InvalidInput(
                "scores are too large to represent".into(),
            ));
        }
        let ratio = if execution_score != 0.0 {
            Some(vision_score / execution_score)
        } else {
            None
        };

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            task: input.task,
            insights_count: input.insights_count,
            insight_value: input.insight_value,
            products_shipped: input.products_shipped,
            weight: input.weight,
            vision_score,
            execution_score,
            total_score,
            ratio,
            timestamp,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn insights_count(&self) -> u64 {
        self.insights_count
    }

    pub fn insight_value(&self) -> f64 {
        self.insight_value
    }

    pub fn products_shipped(&self) -> u64 {
        self.products_shipped
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn vision_score(&self) -> f64 {
        self.vision_score
    }

    pub fn execution_score(&self) -> f64 {
        self.execution_score
    }

    pub fn total_score(&self) -> f64 {
        self.total_score
    }

    /// Vision-to-execution ratio; `None` while nothing has been shipped.
    pub fn ratio(&self) -> Option<f64> {
        self.ratio
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TrackerError::InvalidInput(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Raw inputs for one session, as collected from a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    #[serde(default)]
    pub task: String,
    pub insights_count: u64,
    pub insight_value: f64,
    pub products_shipped: u64,
    pub weight: f64,
}

impl SessionInput {
    /// Parse text form fields. The task is kept verbatim (it may be empty).
    pub fn parse(
        task: &str,
        insights_count: &str,
        insight_value: &str,
        products_shipped: &str,
        weight: &str,
    ) -> Result<Self> {
        Ok(Self {
            task: task.to_string(),
            insights_count: parse_count("insights_count", insights_count)?,
            insight_value: parse_amount("insight_value", insight_value)?,
            products_shipped: parse_count("products_shipped", products_shipped)?,
            weight: parse_amount("weight", weight)?,
        })
    }
}

fn parse_count(field: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| {
        TrackerError::InvalidInput(format!(
            "{} must be a whole number >= 0, got '{}'",
            field,
            raw.trim()
        ))
    })
}

fn parse_amount(field: &str, raw: &str) -> Result<f64> {
    let value = raw.trim().parse::<f64>().map_err(|_| {
        TrackerError::InvalidInput(format!("{} must be a number, got '{}'", field, raw.trim()))
    })?;
    check_non_negative(field, value)?;
    Ok(value)
}

/// Sums and averages over every record in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub session_count: usize,
    pub total_vision: f64,
    pub total_execution: f64,
    pub total_score: f64,
    /// Mean of the defined ratios only; `None` when no session has a ratio.
    pub average_ratio: Option<f64>,
    pub defined_ratio_count: usize,
}

/// Append-only, insertion-ordered collection of sessions.
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<SessionRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a session and return the stored record.
    pub fn append(
        &mut self,
        task: impl Into<String>,
        insights_count: u64,
        insight_value: f64,
        products_shipped: u64,
        weight: f64,
    ) -> Result<SessionRecord> {
        self.append_input(SessionInput {
            task: task.into(),
            insights_count,
            insight_value,
            products_shipped,
            weight,
        })
    }

    /// Log a session from pre-collected inputs.
    pub fn append_input(&mut self, input: SessionInput) -> Result<SessionRecord> {
        let record = SessionRecord::new(input, Utc::now())?;
        tracing::info!(
            task = %record.task,
            total = record.total_score,
            "Session logged"
        );
        self.records.push(record.clone());
        Ok(record)
    }

    /// Records in the order they were logged.
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every record's total score (0.0 when empty).
    pub fn total_score(&self) -> f64 {
        self.records.iter().map(|r| r.total_score).sum()
    }

    /// Daily sums and the mean vision-to-execution ratio.
    pub fn aggregate(&self) -> Result<DailyAggregate> {
        if self.records.is_empty() {
            return Err(TrackerError::EmptyLedger);
        }

        let total_vision = self.records.iter().map(|r| r.vision_score).sum();
        let total_execution = self.records.iter().map(|r| r.execution_score).sum();
        let total_score = self.total_score();

        let ratios: Vec<f64> = self.records.iter().filter_map(|r| r.ratio).collect();
        let average_ratio = if ratios.is_empty() {
            None
        } else {
            Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
        };

        Ok(DailyAggregate {
            session_count: self.records.len(),
            total_vision,
            total_execution,
            total_score,
            average_ratio,
            defined_ratio_count: ratios.len(),
        })
    }
}

/// Fraction of the daily goal covered by `total_score`, capped at 1.0.
pub fn progress_fraction(total_score: f64, goal_hours: f64) -> Result<f64> {
    if !goal_hours.is_finite() || goal_hours <= 0.0 || goal_hours > MAX_GOAL_HOURS {
        return Err(TrackerError::InvalidConfig(format!(
            "goal hours must be within (0, {}], got {}",
            MAX_GOAL_HOURS, goal_hours
        )));
    }
    Ok((total_score / goal_hours).clamp(0.0, 1.0))
}

pub fn goal_reached(progress_fraction: f64) -> bool {
    progress_fraction >= 1.0
}

/// Whole goal units completed, for block-style progress displays.
pub fn completed_hours(progress_fraction: f64, goal_hours: f64) -> u32 {
    (progress_fraction * goal_hours).floor().max(0.0) as u32
}
