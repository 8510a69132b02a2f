// ABOUTME: System-wide constants for progression rules, limits, and configuration defaults
// ABOUTME: Centralizes the threshold table, rewards, history caps, and environment defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # Constants Module
//!
//! Application constants grouped by domain. Environment-backed values live in
//! [`crate::config`]; this module only holds the defaults they fall back to.

/// Affection progression constants
pub mod affection {
    /// Cumulative points required to reach each level, indexed by `level - 1`
    pub const LEVEL_THRESHOLDS: [i32; 10] = [0, 30, 70, 120, 180, 250, 330, 420, 520, 630];

    /// Lowest level a user can hold
    pub const MIN_LEVEL: i32 = 1;

    /// Highest level representable by the threshold table
    pub const MAX_LEVEL: i32 = 10;

    /// Level at which the community becomes available
    pub const COMMUNITY_UNLOCK_LEVEL: i32 = 10;

    /// Points for an ordinary exchange
    pub const DAILY_CONVERSATION_POINTS: i32 = 5;

    /// Points for an exchange classified as deep
    pub const DEEP_CONVERSATION_POINTS: i32 = 15;

    /// Messages longer than this many characters are classified deep
    pub const DEEP_MESSAGE_MIN_CHARS: usize = 50;

    /// Placeholder emotional intensity assigned to every message (0-100 scale)
    pub const DEFAULT_EMOTIONAL_INTENSITY: i32 = 50;

    /// Levels at or above this use the "established" relationship framing
    pub const ESTABLISHED_RELATIONSHIP_LEVEL: i32 = 7;

    /// Levels at or above this use the "developing trust" relationship framing
    pub const DEVELOPING_RELATIONSHIP_LEVEL: i32 = 4;
}

/// Conversation and provider limits
pub mod limits {
    /// Most recent turns forwarded to the model provider
    pub const DEFAULT_HISTORY_WINDOW: usize = 10;

    /// Minimum turns loaded from storage before windowing
    pub const HISTORY_FETCH_LIMIT: i64 = 20;

    /// Seconds allowed for a single provider call
    pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 60;

    /// Attempts to reconcile a concurrent update of the same user
    pub const MAX_PROGRESS_UPDATE_ATTEMPTS: usize = 5;

    /// Maximum accepted request body size in bytes
    pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;
}

/// Defaults for environment-provided configuration
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 3000;

    /// Default bind address
    pub const HOST: &str = "0.0.0.0";

    /// Default database when neither `DATABASE_URL` nor `DB_HOST` is set
    pub const DATABASE_URL: &str = "sqlite:./data/saedam.db";

    /// Default `PostgreSQL` port when assembling a URL from `DB_*` variables
    pub const POSTGRES_PORT: u16 = 5432;

    /// Startup connection attempts before giving up
    pub const DB_CONNECT_MAX_ATTEMPTS: u32 = 10;

    /// Seconds between startup connection attempts
    pub const DB_CONNECT_RETRY_DELAY_SECS: u64 = 2;

    /// Local development front-end origins
    pub const ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:15174";

    /// Default chat model
    pub const OPENAI_MODEL: &str = "gpt-4";

    /// Default `OpenAI` API base URL
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
}

/// Service identity used in logs and the health endpoint
pub mod service_names {
    /// Service name for structured logging
    pub const SAEDAM_SERVER: &str = "saedam-server";

    /// Message reported by the health endpoint
    pub const HEALTH_MESSAGE: &str = "Saedam API is running";
}
