// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, scripted model providers, and a conflict-injecting store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `saedam_server`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use saedam_server::{
    config::ServerConfig,
    database::{ChatStore, Database},
    errors::{AppError, AppResult},
    llm::{ChatRequest, ChatResponse, LlmProvider},
    models::{Message, MessageRole, NewMessage, User},
    resources::ServerResources,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN, // Default to WARN for quiet tests
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup: migrated in-memory `SQLite`
pub async fn create_test_database() -> Arc<Database> {
    init_test_logging();
    let database = Database::connect(&saedam_server::config::DatabaseUrl::Memory)
        .await
        .expect("Failed to open in-memory database");
    database.migrate().await.expect("Failed to migrate");
    Arc::new(database)
}

/// Configuration for tests: in-memory database and a dummy provider key
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("test-key".to_owned()),
        "DATABASE_URL" => Some("sqlite::memory:".to_owned()),
        "ENVIRONMENT" => Some("testing".to_owned()),
        _ => None,
    })
    .expect("Failed to build test config")
}

/// Server resources over a fresh database and the given provider
pub async fn create_test_server_resources(
    llm: Arc<dyn LlmProvider>,
) -> (Arc<ServerResources>, Arc<Database>) {
    let database = create_test_database().await;
    let store: Arc<dyn ChatStore> = database.clone();
    let resources = Arc::new(ServerResources::new(store, llm, Arc::new(test_config())));
    (resources, database)
}

/// Create a user and force its progression fields to `points`
pub async fn create_user_with_points(store: &dyn ChatStore, anonymous_id: &str, points: i32) -> User {
    let (mut user, _) = store
        .get_or_create_user(anonymous_id, Utc::now())
        .await
        .unwrap();
    user.points = points;
    user.level = saedam_server::affection::level(points);
    user.community_unlocked = user.level >= 10;
    assert!(store.update_progress(&user).await.unwrap());
    store.get_user(user.id).await.unwrap().unwrap()
}

/// Overwrite the stored visit date of a user
pub async fn set_last_visit(store: &dyn ChatStore, user_id: i64, at: DateTime<Utc>) -> User {
    let mut user = store.get_user(user_id).await.unwrap().unwrap();
    user.last_visit_date = at;
    assert!(store.update_progress(&user).await.unwrap());
    store.get_user(user_id).await.unwrap().unwrap()
}

/// Insert `count` alternating user/fairy turns with contents `turn 1..=count`
pub async fn seed_turns(store: &dyn ChatStore, user_id: i64, count: usize) -> Vec<Message> {
    let mut stored = Vec::with_capacity(count);
    for i in 1..=count {
        let role = if i % 2 == 1 {
            MessageRole::User
        } else {
            MessageRole::Fairy
        };
        let message = NewMessage {
            role,
            ..NewMessage::inbound(user_id, format!("turn {i}"))
        };
        stored.push(store.insert_message(message).await.unwrap());
    }
    stored
}

// ============================================================================
// Model Provider Doubles
// ============================================================================

/// Provider that answers every request with a fixed reply and records what it was sent
pub struct RecordingProvider {
    reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl RecordingProvider {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_owned(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ChatRequest {
        self.requests().pop().expect("provider was never called")
    }
}

#[async_trait]
impl LlmProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn default_model(&self) -> &str {
        "test-model"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(ChatResponse {
            content: self.reply.clone(),
            model: "test-model".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }
}

/// Provider that always fails like an empty-choice upstream response
pub struct FailingProvider;

#[async_trait]
impl LlmProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn default_model(&self) -> &str {
        "test-model"
    }

    async fn complete(&self, _request: &ChatRequest) -> AppResult<ChatResponse> {
        Err(AppError::external_service(
            "OpenAI",
            "API returned no choices",
        ))
    }
}

/// Provider that takes longer than any test timeout
pub struct SlowProvider {
    pub delay: Duration,
}

#[async_trait]
impl LlmProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn default_model(&self) -> &str {
        "test-model"
    }

    async fn complete(&self, _request: &ChatRequest) -> AppResult<ChatResponse> {
        tokio::time::sleep(self.delay).await;
        Ok(ChatResponse {
            content: "too late".to_owned(),
            model: "test-model".to_owned(),
            usage: None,
            finish_reason: None,
        })
    }
}

// ============================================================================
// Storage Doubles
// ============================================================================

/// Store that lets a simulated concurrent turn win the next `conflicts` progress writes
///
/// Before delegating a progress write, it reloads the user and commits a
/// competing `+competing_points` turn, so the caller's write fails its
/// revision check.
pub struct ConflictingStore {
    inner: Arc<Database>,
    remaining: AtomicUsize,
    competing_points: i32,
}

impl ConflictingStore {
    pub fn new(inner: Arc<Database>, conflicts: usize, competing_points: i32) -> Self {
        Self {
            inner,
            remaining: AtomicUsize::new(conflicts),
            competing_points,
        }
    }
}

#[async_trait]
impl ChatStore for ConflictingStore {
    async fn find_user_by_anonymous_id(&self, anonymous_id: &str) -> AppResult<Option<User>> {
        self.inner.find_user_by_anonymous_id(anonymous_id).await
    }

    async fn get_or_create_user(
        &self,
        anonymous_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<(User, bool)> {
        self.inner.get_or_create_user(anonymous_id, now).await
    }

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        self.inner.get_user(user_id).await
    }

    async fn insert_message(&self, message: NewMessage) -> AppResult<Message> {
        self.inner.insert_message(message).await
    }

    async fn recent_messages(
        &self,
        user_id: i64,
        before_message_id: i64,
        limit: i64,
    ) -> AppResult<Vec<Message>> {
        self.inner
            .recent_messages(user_id, before_message_id, limit)
            .await
    }

    async fn list_messages(&self, user_id: i64) -> AppResult<Vec<Message>> {
        self.inner.list_messages(user_id).await
    }

    async fn update_progress(&self, user: &User) -> AppResult<bool> {
        let should_conflict = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if should_conflict {
            let mut competitor = self.inner.get_user(user.id).await?.unwrap();
            competitor.points += self.competing_points;
            competitor.total_conversations += 1;
            competitor.level = saedam_server::affection::level(competitor.points);
            assert!(self.inner.update_progress(&competitor).await?);
        }

        self.inner.update_progress(user).await
    }

    async fn health_check(&self) -> AppResult<()> {
        self.inner.health_check().await
    }
}
