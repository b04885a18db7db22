//! Insight summarizer.
//!
//! Turns a batch of free-text insight lines into one prompt, asks the
//! configured text generator for a summary, and always hands the caller a
//! displayable [`SummaryResult`], never a provider error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{Result, TrackerError};
use crate::insights::{clean_lines, InsightLog};
use crate::provider::{OpenAiGenerator, TextGenerator};
use crate::types::{ChatMessage, GenerationRequest};

const PROMPT_HEADER: &str = "Here are the insights I logged today:\n";

/// The three things every summary must contain.
const PROMPT_INSTRUCTION: &str = "Please summarize these insights concisely in one short paragraph, \
     give me a direct, encouraging comment on them, \
     and suggest any patterns I may have missed.";

/// Outcome of one summary request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryResult {
    Completed { text: String },
    Failed { cause: String },
}

impl SummaryResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, SummaryResult::Completed { .. })
    }

    /// Text suitable for showing to the user either way.
    pub fn display_text(&self) -> String {
        match self {
            SummaryResult::Completed { text } => text.clone(),
            SummaryResult::Failed { cause } => format!("Error generating summary: {}", cause),
        }
    }
}

/// A validated, non-empty batch of trimmed insight lines.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightBatch {
    lines: Vec<String>,
}

impl InsightBatch {
    /// Trim the lines and drop blanks; fails if nothing is left.
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let lines = clean_lines(lines);
        if lines.is_empty() {
            return Err(TrackerError::EmptyInsightBatch);
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Numbered prompt asking for a summary, a comment and missed patterns.
    pub fn prompt(&self) -> String {
        let mut prompt = String::from(PROMPT_HEADER);
        for (i, line) in self.lines.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, line));
        }
        prompt.push('\n');
        prompt.push_str(PROMPT_INSTRUCTION);
        prompt
    }
}

/// Summarizes insight batches through a [`TextGenerator`].
pub struct InsightSummarizer {
    generator: Arc<dyn TextGenerator>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    system_prompt: Option<String>,
    timeout: Duration,
    in_flight: Mutex<()>,
}

impl InsightSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &AppConfig) -> Self {
        Self {
            generator,
            model: config.provider.model.clone(),
            max_tokens: config.provider.max_tokens,
            temperature: config.provider.temperature,
            system_prompt: config.system_prompt.clone(),
            timeout: Duration::from_secs(config.provider.timeout_secs),
            in_flight: Mutex::new(()),
        }
    }

    /// Build a summarizer talking to the configured OpenAI-compatible endpoint.
    pub fn from_config(config: &AppConfig) -> Self {
        let generator = Arc::new(OpenAiGenerator::from_config(&config.provider));
        Self::new(generator, config)
    }

    /// Record the batch in `log` and summarize it.
    ///
    /// Only an empty batch is an error; provider failures come back as
    /// `SummaryResult::Failed`.
    pub async fn submit<S: AsRef<str>>(
        &self,
        log: &mut InsightLog,
        lines: &[S],
    ) -> Result<SummaryResult> {
        let batch = InsightBatch::new(lines)?;
        log.extend(batch.lines().iter().cloned());
        Ok(self.summarize(&batch).await)
    }

    /// Make exactly one generation attempt for an already-recorded batch.
    pub async fn summarize(&self, batch: &InsightBatch) -> SummaryResult {
        let request = self.request_for(batch);

        // One request at a time per summarizer.
        let _guard = self.in_flight.lock().await;

        let outcome = match tokio::time::timeout(self.timeout, self.generator.generate(&request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TrackerError::ExternalCallFailure(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))),
        };

        match outcome {
            Ok(text) => {
                info!(lines = batch.lines().len(), "Insight summary generated");
                SummaryResult::Completed {
                    text: text.trim().to_string(),
                }
            }
            Err(e) => {
                warn!("Insight summary failed: {}", e);
                let cause = match e {
                    TrackerError::ExternalCallFailure(cause) => cause,
                    other => other.to_string(),
                };
                SummaryResult::Failed { cause }
            }
        }
    }

    fn request_for(&self, batch: &InsightBatch) -> GenerationRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage::system(system.as_str()));
        }
        messages.push(ChatMessage::user(batch.prompt()));
        GenerationRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}
