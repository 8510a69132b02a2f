// ABOUTME: User route handlers for profile, message history, and level progress lookups
// ABOUTME: Users are addressed by their anonymous identifier
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::affection::{level_progress, AffectionStage};
use crate::errors::{AppError, AppResult};
use crate::models::{Message, User};
use crate::resources::ServerResources;

/// Level progress of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    /// Anonymous identifier
    pub anonymous_id: String,
    /// Current level
    pub level: i32,
    /// Cumulative points
    pub points: i32,
    /// Points earned within the current level
    pub current: i32,
    /// Points spanned by the current level
    pub needed: i32,
    /// Floored percentage toward the next level
    pub percentage: i32,
    /// Relationship stage
    pub stage: AffectionStage,
    /// Display label of the stage
    pub stage_label: String,
    /// Whether the community is unlocked
    pub community_unlocked: bool,
}

impl From<&User> for ProgressResponse {
    fn from(user: &User) -> Self {
        let progress = level_progress(user.points);
        let stage = AffectionStage::for_level(progress.level);
        Self {
            anonymous_id: user.anonymous_id.clone(),
            level: progress.level,
            points: user.points,
            current: progress.current,
            needed: progress.needed,
            percentage: progress.percentage,
            stage,
            stage_label: stage.label().to_owned(),
            community_unlocked: user.community_unlocked,
        }
    }
}

/// User routes handler
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/users/:id", get(Self::get_user))
            .route("/api/v1/users/:id/messages", get(Self::get_messages))
            .route("/api/v1/users/:id/progress", get(Self::get_progress))
            .with_state(resources)
    }

    async fn find_user(resources: &ServerResources, anonymous_id: &str) -> AppResult<User> {
        resources
            .store
            .find_user_by_anonymous_id(anonymous_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    async fn get_user(
        State(resources): State<Arc<ServerResources>>,
        Path(anonymous_id): Path<String>,
    ) -> AppResult<Json<User>> {
        Ok(Json(Self::find_user(&resources, &anonymous_id).await?))
    }

    /// Messages in conversation order
    async fn get_messages(
        State(resources): State<Arc<ServerResources>>,
        Path(anonymous_id): Path<String>,
    ) -> AppResult<Json<Vec<Message>>> {
        let user = Self::find_user(&resources, &anonymous_id).await?;
        Ok(Json(resources.store.list_messages(user.id).await?))
    }

    async fn get_progress(
        State(resources): State<Arc<ServerResources>>,
        Path(anonymous_id): Path<String>,
    ) -> AppResult<Json<ProgressResponse>> {
        let user = Self::find_user(&resources, &anonymous_id).await?;
        Ok(Json(ProgressResponse::from(&user)))
    }
}
