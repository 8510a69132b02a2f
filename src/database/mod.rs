// ABOUTME: Persistence layer for anonymous users and chat messages
// ABOUTME: Defines the ChatStore contract and a backend-selecting Database wrapper with retrying connect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # Database
//!
//! The chat service talks to storage through [`ChatStore`]. [`Database`] picks
//! the backend from the configured URL: `SQLite` always, `PostgreSQL` when the
//! `postgresql` feature is enabled.
//!
//! Schema changes are versioned SQL files under `migrations/`, embedded at
//! compile time and applied only through [`Database::migrate`].

mod sqlite;

#[cfg(feature = "postgresql")]
mod postgres;

#[cfg(feature = "postgresql")]
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Message, NewMessage, User};

// ============================================================================
// Storage Contract
// ============================================================================

/// Storage operations used by the chat service and the read endpoints
///
/// Soft-deleted rows are invisible to every read.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Look up a user by anonymous identifier
    async fn find_user_by_anonymous_id(&self, anonymous_id: &str) -> AppResult<Option<User>>;

    /// Fetch the user for `anonymous_id`, creating it on first sight
    ///
    /// Creation is a single atomic upsert, so concurrent first requests for the
    /// same identifier converge on one row. The flag is `true` only for the
    /// caller whose insert created it.
    async fn get_or_create_user(
        &self,
        anonymous_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<(User, bool)>;

    /// Look up a user by storage id
    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>>;

    /// Persist a message and return the stored row
    async fn insert_message(&self, message: NewMessage) -> AppResult<Message>;

    /// Up to `limit` messages older than `before_message_id`, newest first
    async fn recent_messages(
        &self,
        user_id: i64,
        before_message_id: i64,
        limit: i64,
    ) -> AppResult<Vec<Message>>;

    /// All messages of a user in conversation order
    async fn list_messages(&self, user_id: i64) -> AppResult<Vec<Message>>;

    /// Write the progression fields of `user` if nobody else has since it was read
    ///
    /// Compares on `revision`. Returns `false` and writes nothing when the
    /// stored revision has moved on.
    async fn update_progress(&self, user: &User) -> AppResult<bool>;

    /// Check that the store answers queries
    async fn health_check(&self) -> AppResult<()>;
}

// ============================================================================
// Backend Selection
// ============================================================================

/// Database instance wrapper that delegates to the configured backend
#[derive(Debug, Clone)]
pub enum Database {
    /// `SQLite` file or in-memory database
    SQLite(SqliteStore),
    /// `PostgreSQL` server
    #[cfg(feature = "postgresql")]
    PostgreSQL(PostgresStore),
}

impl Database {
    /// Connect once to the database at `url`
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or `url` names `PostgreSQL`
    /// without the `postgresql` feature
    pub async fn connect(url: &DatabaseUrl) -> AppResult<Self> {
        match url {
            DatabaseUrl::SQLite { .. } | DatabaseUrl::Memory => {
                Ok(Self::SQLite(SqliteStore::connect(url).await?))
            }
            #[cfg(feature = "postgresql")]
            DatabaseUrl::PostgreSQL { connection_string } => {
                Ok(Self::PostgreSQL(PostgresStore::connect(connection_string).await?))
            }
            #[cfg(not(feature = "postgresql"))]
            DatabaseUrl::PostgreSQL { .. } => Err(AppError::config(
                "PostgreSQL support not enabled. Enable the 'postgresql' feature flag.",
            )),
        }
    }

    /// Connect with a bounded number of attempts and a fixed delay between them
    ///
    /// # Errors
    ///
    /// Returns the last connection error once every attempt has failed
    pub async fn connect_with_retry(config: &DatabaseConfig) -> AppResult<Self> {
        let attempts = config.connect_max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match Self::connect(&config.url).await {
                Ok(db) => {
                    info!(
                        backend = db.backend_info(),
                        attempt, "Connected to database"
                    );
                    return Ok(db);
                }
                Err(e) if e.code == ErrorCode::ConfigError => return Err(e),
                Err(e) if attempt >= attempts => {
                    error!(attempts, "Giving up connecting to database: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        retry_in_secs = config.connect_retry_delay.as_secs(),
                        "Database connection failed: {}",
                        e
                    );
                    tokio::time::sleep(config.connect_retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Apply pending migrations for the active backend
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails to apply
    pub async fn migrate(&self) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.migrate().await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.migrate().await,
        }
    }

    /// Get a descriptive string for the current database backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::SQLite(_) => "SQLite",
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(_) => "PostgreSQL",
        }
    }
}

#[async_trait]
impl ChatStore for Database {
    async fn find_user_by_anonymous_id(&self, anonymous_id: &str) -> AppResult<Option<User>> {
        match self {
            Self::SQLite(db) => db.find_user_by_anonymous_id(anonymous_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.find_user_by_anonymous_id(anonymous_id).await,
        }
    }

    async fn get_or_create_user(
        &self,
        anonymous_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<(User, bool)> {
        match self {
            Self::SQLite(db) => db.get_or_create_user(anonymous_id, now).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_or_create_user(anonymous_id, now).await,
        }
    }

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        match self {
            Self::SQLite(db) => db.get_user(user_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_user(user_id).await,
        }
    }

    async fn insert_message(&self, message: NewMessage) -> AppResult<Message> {
        match self {
            Self::SQLite(db) => db.insert_message(message).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.insert_message(message).await,
        }
    }

    async fn recent_messages(
        &self,
        user_id: i64,
        before_message_id: i64,
        limit: i64,
    ) -> AppResult<Vec<Message>> {
        match self {
            Self::SQLite(db) => db.recent_messages(user_id, before_message_id, limit).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.recent_messages(user_id, before_message_id, limit).await,
        }
    }

    async fn list_messages(&self, user_id: i64) -> AppResult<Vec<Message>> {
        match self {
            Self::SQLite(db) => db.list_messages(user_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.list_messages(user_id).await,
        }
    }

    async fn update_progress(&self, user: &User) -> AppResult<bool> {
        match self {
            Self::SQLite(db) => db.update_progress(user).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.update_progress(user).await,
        }
    }

    async fn health_check(&self) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.health_check().await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.health_check().await,
        }
    }
}

/// Shared error for an upsert that neither inserted nor found a live row
fn deleted_user_error(anonymous_id: &str) -> AppError {
    AppError::conflict(format!("User {anonymous_id} has been deleted"))
}
