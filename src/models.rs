// ABOUTME: Core data models for anonymous users and their chat messages
// ABOUTME: Defines User, Message, MessageRole, and the insert payload for new messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # Data Models
//!
//! A [`User`] is an anonymous profile keyed by a client-generated identifier.
//! Its `level` is always derived from `points` and `community_unlocked` only
//! ever moves from `false` to `true`. A [`Message`] belongs to exactly one user
//! and is immutable once written; creation order is conversation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::affection::Classification;
use crate::constants::affection::MIN_LEVEL;
use crate::errors::AppError;

/// Anonymous user profile with affection progression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Storage identifier
    pub id: i64,
    /// Client-generated opaque identifier
    pub anonymous_id: String,
    /// Current level, derived from `points`
    pub level: i32,
    /// Cumulative affection points
    pub points: i32,
    /// Completed chat turns
    pub total_conversations: i32,
    /// Chat turns classified as deep
    pub deep_conversations: i32,
    /// Consecutive calendar days with at least one visit
    pub consecutive_days: i32,
    /// Last time the user chatted
    pub last_visit_date: DateTime<Utc>,
    /// Community access, granted at the unlock level and never revoked
    pub community_unlocked: bool,
    /// Optimistic concurrency counter, bumped on every progress write
    #[serde(skip)]
    pub revision: i64,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
    /// When the profile was last written
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A profile that has not been persisted yet
    #[must_use]
    pub fn new_anonymous(anonymous_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            anonymous_id: anonymous_id.into(),
            level: MIN_LEVEL,
            points: 0,
            total_conversations: 0,
            deep_conversations: 0,
            consecutive_days: 1,
            last_visit_date: now,
            community_unlocked: false,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The person chatting
    User,
    /// The companion persona (model output)
    Fairy,
    /// Instruction text
    System,
}

impl MessageRole {
    /// Storage and wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Fairy => "fairy",
            Self::System => "system",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "fairy" => Ok(Self::Fairy),
            "system" => Ok(Self::System),
            other => Err(AppError::database(format!("Unknown message role: {other}"))),
        }
    }
}

/// A persisted chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Storage identifier
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Author
    pub role: MessageRole,
    /// Text content
    pub content: String,
    /// Whether the exchange was classified deep (model messages only)
    pub is_deep: bool,
    /// Emotional intensity score 0-100 (model messages only)
    pub emotional_intensity: i32,
    /// Points awarded for the exchange (model messages only)
    pub affection_gained: i32,
    /// Creation time, defines conversation order
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Owning user
    pub user_id: i64,
    /// Author
    pub role: MessageRole,
    /// Text content
    pub content: String,
    /// Deep classification flag
    pub is_deep: bool,
    /// Emotional intensity score
    pub emotional_intensity: i32,
    /// Points awarded
    pub affection_gained: i32,
}

impl NewMessage {
    /// The user's inbound message, stored without classification
    #[must_use]
    pub fn inbound(user_id: i64, content: impl Into<String>) -> Self {
        Self {
            user_id,
            role: MessageRole::User,
            content: content.into(),
            is_deep: false,
            emotional_intensity: 0,
            affection_gained: 0,
        }
    }

    /// The model's reply, carrying the classification of the exchange
    #[must_use]
    pub fn outbound(
        user_id: i64,
        content: impl Into<String>,
        classification: &Classification,
    ) -> Self {
        Self {
            user_id,
            role: MessageRole::Fairy,
            content: content.into(),
            is_deep: classification.is_deep,
            emotional_intensity: classification.emotional_intensity,
            affection_gained: classification.affection_gained,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_storage_string() {
        for role in [MessageRole::User, MessageRole::Fairy, MessageRole::System] {
            assert_eq!(role.as_str().parse::<MessageRole>().unwrap(), role);
        }
        assert!("assistant".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_user_json_hides_revision() {
        let user = User::new_anonymous("anon-1", Utc::now());
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["level"], 1);
        assert_eq!(json["points"], 0);
        assert_eq!(json["community_unlocked"], false);
        assert!(json.get("revision").is_none());
    }
}
