//! services/api/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the education summary LLM.
//! It implements the `SummaryGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use diabetes_education_core::ports::{GenerationError, SummaryGenerationService, SummaryRequest};
use std::time::Duration;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SummaryGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`. Every call is bounded by `timeout`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }

    /// Builds the single-choice chat request for one summary.
    fn chat_request(
        &self,
        request: &SummaryRequest,
    ) -> Result<CreateChatCompletionRequest, GenerationError> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system_instructions.as_str())
                .build()
                .map_err(|e| GenerationError::Other(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user_profile.as_str())
                .build()
                .map_err(|e| GenerationError::Other(e.to_string()))?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .temperature(0.4)
            .build()
            .map_err(|e| GenerationError::Other(e.to_string()))
    }
}

//=========================================================================================
// Error Classification
//=========================================================================================

const AUTH_CODES: &[&str] = &[
    "invalid_api_key",
    "invalid_authentication",
    "account_deactivated",
    "invalid_organization",
];
const AUTH_TYPES: &[&str] = &["authentication_error", "permission_error"];
const QUOTA_CODES: &[&str] = &["insufficient_quota", "rate_limit_exceeded"];
const QUOTA_TYPES: &[&str] = &["insufficient_quota", "rate_limit_error", "requests", "tokens"];

fn is_one_of(value: Option<&str>, set: &[&str]) -> bool {
    value.is_some_and(|v| set.iter().any(|candidate| *candidate == v))
}

/// Sorts a provider error body into one of the failure kinds the form distinguishes.
pub fn classify_api_failure(
    error_type: Option<&str>,
    code: Option<&str>,
    message: &str,
) -> GenerationError {
    let code = code.map(|c| c.trim_matches('"'));

    if is_one_of(code, AUTH_CODES)
        || is_one_of(error_type, AUTH_TYPES)
        || message.contains("Incorrect API key")
    {
        GenerationError::Authentication(message.to_string())
    } else if is_one_of(code, QUOTA_CODES) || is_one_of(error_type, QUOTA_TYPES) {
        GenerationError::QuotaExceeded(message.to_string())
    } else {
        GenerationError::Other(message.to_string())
    }
}

fn classify_openai_error(err: OpenAIError) -> GenerationError {
    match err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_ref().map(|c| c.to_string());
            classify_api_failure(api_err.r#type.as_deref(), code.as_deref(), &api_err.message)
        }
        other => GenerationError::Other(other.to_string()),
    }
}

//=========================================================================================
// `SummaryGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummaryGenerationService for OpenAiSummaryAdapter {
    /// Sends the instructions and profile text as one chat completion and returns the reply.
    async fn generate_summary(&self, request: &SummaryRequest) -> Result<String, GenerationError> {
        let chat_request = self.chat_request(request)?;

        debug!(model = %self.model, "Requesting education summary");
        let client = self.client.clone();
        let call = async move { client.chat().create(chat_request).await };
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                warn!("Summary request exceeded {:?}", self.timeout);
                GenerationError::Timeout(self.timeout.as_secs())
            })?
            .map_err(classify_openai_error)?;

        // Extract the text content from the first choice in the response.
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                GenerationError::Other(
                    "Summary LLM response contained no text content.".to_string(),
                )
            })?;

        if content.trim().is_empty() {
            return Err(GenerationError::Other(
                "Summary LLM returned an empty response.".to_string(),
            ));
        }
        Ok(content)
    }
}
