use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::TrackerError;
use crate::types::{ChatMessage, GenerationRequest, Role};

/// Anything that can turn a prompt into generated text.
///
/// Failures are reported as `TrackerError::ExternalCallFailure`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, TrackerError>;
}

/// Generator backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
}

impl OpenAiGenerator {
    pub fn from_config(config: &ProviderConfig) -> Self {
        let api_key = config.resolve_api_key().unwrap_or_else(|| {
            warn!(
                "No API key configured for {}; requests will be sent without one",
                config.api_base
            );
            "not-needed".to_string()
        });
        let openai_config = OpenAIConfig::new()
            .with_api_base(&config.api_base)
            .with_api_key(api_key);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("vision-tracker/0.1")
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    "Failed to build HTTP client ({}); falling back to reqwest defaults",
                    e
                );
                reqwest::Client::new()
            });

        // One attempt per request: a zero elapsed-time budget disables the
        // client's built-in rate-limit retries.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(openai_config)
            .with_http_client(http)
            .with_backoff(no_retry);
        Self { client }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, TrackerError> {
        let messages = to_openai_messages(&request.messages)?;

        let openai_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_completion_tokens(request.max_tokens)
            .build()
            .map_err(|e| TrackerError::ExternalCallFailure(e.to_string()))?;

        debug!(model = %request.model, "Sending completion request");

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| TrackerError::ExternalCallFailure(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TrackerError::ExternalCallFailure("No choices in response".into()))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(TrackerError::ExternalCallFailure(
                "Provider returned an empty completion".into(),
            ));
        }
        Ok(content.to_string())
    }
}

fn to_openai_messages(
    messages: &[ChatMessage],
) -> Result<Vec<ChatCompletionRequestMessage>, TrackerError> {
    messages
        .iter()
        .map(|msg| {
            let built = match msg.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(msg.content.as_str())
                    .build()
                    .map(ChatCompletionRequestMessage::System),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(msg.content.as_str())
                    .build()
                    .map(ChatCompletionRequestMessage::User),
            };
            built.map_err(|e| TrackerError::ExternalCallFailure(e.to_string()))
        })
        .collect()
}
