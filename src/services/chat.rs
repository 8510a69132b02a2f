// ABOUTME: Chat orchestration service running one conversational turn end to end
// ABOUTME: Persists both sides of the exchange, calls the model, and applies affection progression
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # Chat Service
//!
//! One call to [`ChatService::send_message`] runs a full turn:
//!
//! 1. find or create the user for the anonymous identifier
//! 2. persist the inbound message
//! 3. load and window the earlier history
//! 4. build the level-dependent system prompt and call the provider
//! 5. classify the exchange and persist the reply
//! 6. apply the award and visit streak, write the user back
//!
//! The inbound message is stored before the provider is called, so a failed
//! or timed-out call leaves it in place without a reply. The user write is an
//! optimistic compare-and-swap: on conflict the fresh row is reloaded and the
//! same award is applied again, so concurrent turns add up instead of
//! overwriting each other.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::affection::{apply_progression, record_visit, Classification, ProgressionOutcome};
use crate::constants::limits::{HISTORY_FETCH_LIMIT, MAX_PROGRESS_UPDATE_ATTEMPTS};
use crate::database::ChatStore;
use crate::errors::{AppError, AppResult};
use crate::llm::{build_context, build_system_prompt, ChatRequest, ChatResponse, LlmProvider};
use crate::models::{Message, NewMessage, User};

/// Result of a completed turn
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The user after progression was applied
    pub user: User,
    /// The persisted reply
    pub reply: Message,
    /// What the turn did to the user's level
    pub progression: ProgressionOutcome,
    /// Whether this turn created the user
    pub user_created: bool,
}

impl ChatOutcome {
    /// Points awarded for the turn
    #[must_use]
    pub const fn affection_gained(&self) -> i32 {
        self.reply.affection_gained
    }
}

/// Runs chat turns against injected storage and model provider
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    llm: Arc<dyn LlmProvider>,
    history_window: usize,
    history_fetch_limit: i64,
    provider_timeout: Duration,
}

impl ChatService {
    /// Create a chat service
    #[must_use]
    pub fn new(
        store: Arc<dyn ChatStore>,
        llm: Arc<dyn LlmProvider>,
        history_window: usize,
        provider_timeout: Duration,
    ) -> Self {
        // Load at least a full window of earlier turns
        let history_fetch_limit = i64::try_from(history_window)
            .unwrap_or(i64::MAX)
            .max(HISTORY_FETCH_LIMIT);

        Self {
            store,
            llm,
            history_window,
            history_fetch_limit,
            provider_timeout,
        }
    }

    /// Run one turn for `anonymous_id`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the identifier or message is blank
    /// - `ExternalServiceError` / `ExternalTimeout` if the provider fails
    /// - `ResourceConflict` if the user kept changing underneath every write attempt
    /// - `DatabaseError` if storage fails at any step
    #[instrument(skip(self, message), fields(message_chars = message.chars().count()))]
    pub async fn send_message(&self, anonymous_id: &str, message: &str) -> AppResult<ChatOutcome> {
        if anonymous_id.trim().is_empty() {
            return Err(AppError::invalid_input("anonymous_id must not be empty"));
        }
        if message.trim().is_empty() {
            return Err(AppError::invalid_input("message must not be empty"));
        }

        let now = Utc::now();
        let (user, user_created) = self.store.get_or_create_user(anonymous_id, now).await?;
        if user_created {
            info!(user_id = user.id, "Created anonymous user");
        }

        let inbound = self
            .store
            .insert_message(NewMessage::inbound(user.id, message))
            .await?;

        let history = self
            .store
            .recent_messages(user.id, inbound.id, self.history_fetch_limit)
            .await?;
        let context = build_context(
            build_system_prompt(user.level),
            history,
            self.history_window,
            message,
        );

        let response = self.call_provider(ChatRequest::new(context)).await?;

        let classification = Classification::of(message);
        let reply = self
            .store
            .insert_message(NewMessage::outbound(
                user.id,
                response.content,
                &classification,
            ))
            .await?;

        let (user, progression) = self.commit_progress(user, &classification, now).await?;

        if progression.leveled_up() {
            info!(
                user_id = user.id,
                from = progression.previous_level,
                to = progression.new_level,
                "User leveled up"
            );
        }
        if progression.community_newly_unlocked {
            info!(user_id = user.id, "Community unlocked");
        }

        Ok(ChatOutcome {
            user,
            reply,
            progression,
            user_created,
        })
    }

    /// Single bounded provider call, no retry
    async fn call_provider(&self, request: ChatRequest) -> AppResult<ChatResponse> {
        let started = Instant::now();
        let result = tokio::time::timeout(self.provider_timeout, self.llm.complete(&request)).await;
        let elapsed_ms = started.elapsed().as_millis();

        match result {
            Ok(Ok(response)) => {
                debug!(
                    provider = self.llm.name(),
                    model = %response.model,
                    elapsed_ms,
                    "Provider call completed"
                );
                Ok(response)
            }
            Ok(Err(e)) => {
                warn!(provider = self.llm.name(), elapsed_ms, "Provider call failed: {}", e);
                Err(e)
            }
            Err(_) => {
                warn!(
                    provider = self.llm.name(),
                    timeout_secs = self.provider_timeout.as_secs(),
                    "Provider call timed out"
                );
                Err(AppError::external_timeout(
                    self.llm.name(),
                    self.provider_timeout.as_secs(),
                ))
            }
        }
    }

    /// Apply the turn to the user and write it with compare-and-swap
    async fn commit_progress(
        &self,
        mut snapshot: User,
        classification: &Classification,
        now: DateTime<Utc>,
    ) -> AppResult<(User, ProgressionOutcome)> {
        for attempt in 1..=MAX_PROGRESS_UPDATE_ATTEMPTS {
            let mut next = snapshot.clone();
            record_visit(&mut next, now);
            let outcome = apply_progression(&mut next, classification);
            next.updated_at = Utc::now();

            if self.store.update_progress(&next).await? {
                next.revision += 1;
                return Ok((next, outcome));
            }

            debug!(
                user_id = snapshot.id,
                attempt, "User changed concurrently, reloading"
            );
            snapshot = self
                .store
                .get_user(snapshot.id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User {}", snapshot.id)))?;
        }

        warn!(
            user_id = snapshot.id,
            attempts = MAX_PROGRESS_UPDATE_ATTEMPTS,
            "Gave up updating user progress"
        );
        Err(AppError::conflict(
            "User was updated concurrently too many times, please retry",
        ))
    }
}
