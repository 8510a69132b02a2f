// ABOUTME: Chat route handler that runs one conversational turn with the fairy
// ABOUTME: Validates the request body and reports the reply with the resulting progression
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! Chat route
//!
//! The body is parsed by hand instead of through the `Json` extractor so that
//! every malformed body (bad JSON, wrong content type, missing or mistyped
//! fields) is answered with the same 400 error envelope.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::resources::ServerResources;
use crate::services::ChatOutcome;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to send a chat message
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    /// Client-generated identifier of the user
    pub anonymous_id: String,
    /// Message text
    pub message: String,
}

/// Result of a chat turn
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    /// The fairy's reply
    pub message: String,
    /// Points awarded for this turn
    pub affection_gained: i32,
    /// Level after the turn
    pub new_level: i32,
    /// Points after the turn
    pub new_points: i32,
    /// Whether the community is unlocked
    pub community_unlocked: bool,
}

impl From<ChatOutcome> for ChatMessageResponse {
    fn from(outcome: ChatOutcome) -> Self {
        Self {
            affection_gained: outcome.affection_gained(),
            message: outcome.reply.content,
            new_level: outcome.user.level,
            new_points: outcome.user.points,
            community_unlocked: outcome.user.community_unlocked,
        }
    }
}

// ============================================================================
// Chat Routes
// ============================================================================

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/chat", post(Self::send_message))
            .with_state(resources)
    }

    /// Run one chat turn
    async fn send_message(
        State(resources): State<Arc<ServerResources>>,
        body: Bytes,
    ) -> AppResult<Json<ChatMessageResponse>> {
        let request: ChatMessageRequest = serde_json::from_slice(&body).map_err(|e| {
            AppError::new(ErrorCode::InvalidFormat, format!("Invalid request body: {e}"))
        })?;

        let outcome = resources
            .chat
            .send_message(&request.anonymous_id, &request.message)
            .await?;

        info!(
            user_id = outcome.user.id,
            affection_gained = outcome.affection_gained(),
            level = outcome.user.level,
            points = outcome.user.points,
            "Chat turn completed"
        );

        Ok(Json(outcome.into()))
    }
}
