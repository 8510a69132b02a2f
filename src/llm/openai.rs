// ABOUTME: OpenAI chat completions provider used to generate the fairy's replies
// ABOUTME: Works against any OpenAI-compatible endpoint via a configurable base URL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # `OpenAI` Provider
//!
//! Implementation of the `LlmProvider` trait for the `OpenAI` chat completions
//! API. The base URL is configurable, so a local `OpenAI`-compatible inference
//! server works as well.
//!
//! ## Configuration
//!
//! - `OPENAI_API_KEY` (required)
//! - `OPENAI_MODEL` (default `gpt-4`)
//! - `OPENAI_BASE_URL` (default `https://api.openai.com/v1`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use crate::config::LlmConfig;
use crate::errors::{AppError, AppResult};

/// Service name used in error messages
const SERVICE_NAME: &str = "OpenAI";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// `OpenAI` chat completions provider
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout_secs: u64,
}

impl OpenAiProvider {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &LlmConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// Parse an error response from the API
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| {
                AppError::external_service(
                    SERVICE_NAME,
                    format!(
                        "API error ({status}): {}",
                        body.chars().take(200).collect::<String>()
                    ),
                )
            },
            |parsed| {
                let detail = parsed.error.message;
                match status.as_u16() {
                    401 => AppError::external_service(
                        SERVICE_NAME,
                        format!("Authentication failed: {detail}"),
                    ),
                    429 => AppError::external_service(
                        SERVICE_NAME,
                        format!("Rate limit exceeded: {detail}"),
                    ),
                    _ => {
                        let error_type = parsed.error.error_type.as_deref().unwrap_or("unknown");
                        AppError::external_service(SERVICE_NAME, format!("{error_type} - {detail}"))
                    }
                }
            },
        )
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.model)))]
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let model = request.model.as_deref().unwrap_or(&self.model);

        debug!(messages = request.messages.len(), "Sending chat completion request");

        let body = OpenAiRequest {
            model,
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
        };

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to OpenAI API: {}", e);
                if e.is_timeout() {
                    AppError::external_timeout(SERVICE_NAME, self.timeout_secs).with_source(e)
                } else {
                    AppError::external_service(SERVICE_NAME, format!("Failed to connect: {e}"))
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("Failed to read OpenAI API response: {}", e);
            AppError::external_service(SERVICE_NAME, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &text));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse OpenAI API response: {}", e);
            AppError::external_service(SERVICE_NAME, format!("Failed to parse response: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE_NAME, "API returned no choices"))?;

        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Received response from OpenAI: {} chars, finish_reason: {:?}",
            content.chars().count(),
            choice.finish_reason
        );

        Ok(ChatResponse {
            content,
            model: parsed.model.unwrap_or_else(|| model.to_owned()),
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}
