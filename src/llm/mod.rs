// ABOUTME: Language-model provider abstraction for generating the fairy's replies
// ABOUTME: Defines chat message types, the provider trait, prompts, and history windowing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # LLM Provider Interface
//!
//! The chat service depends on [`LlmProvider`] only, so tests can substitute a
//! scripted double for the HTTP-backed [`OpenAiProvider`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use saedam_server::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::system("You are a warm companion."),
//!         ChatMessage::user("I had a hard day."),
//!     ]);
//!     let response = provider.complete(&request).await;
//! }
//! ```

pub mod history;
mod openai;
pub mod prompts;

pub use history::{build_context, window_history};
pub use openai::OpenAiProvider;
pub use prompts::build_system_prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message sent to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier, provider default when absent
    pub model: Option<String>,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Response from a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated message content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Chat completion backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "openai")
    fn name(&self) -> &'static str;

    /// Model used when the request does not name one
    fn default_model(&self) -> &str;

    /// Perform a single chat completion
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse>;
}
