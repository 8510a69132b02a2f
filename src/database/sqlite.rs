// ABOUTME: SQLite implementation of the chat store
// ABOUTME: Handles user upsert, optimistic progress updates, and message history queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::{deleted_user_error, ChatStore};
use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult};
use crate::models::{Message, MessageRole, NewMessage, User};

const USER_COLUMNS: &str = "id, anonymous_id, level, points, total_conversations, \
     deep_conversations, consecutive_days, last_visit_date, community_unlocked, revision, \
     created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, user_id, role, content, is_deep, emotional_intensity, \
     affection_gained, created_at, updated_at";

/// `SQLite`-backed chat store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a pool for a file or in-memory database
    ///
    /// Files and their parent directory are created when missing. An in-memory
    /// database is held on a single connection so every query sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened
    pub async fn connect(url: &DatabaseUrl) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new().max_connections(1)
        } else {
            if let DatabaseUrl::SQLite { path } = url {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to SQLite: {e}")))?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply embedded `SQLite` migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails to apply
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to run migrations: {e}")))?;
        debug!("SQLite migrations applied");
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> AppResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        anonymous_id: row.try_get("anonymous_id")?,
        level: row.try_get("level")?,
        points: row.try_get("points")?,
        total_conversations: row.try_get("total_conversations")?,
        deep_conversations: row.try_get("deep_conversations")?,
        consecutive_days: row.try_get("consecutive_days")?,
        last_visit_date: row.try_get("last_visit_date")?,
        community_unlocked: row.try_get("community_unlocked")?,
        revision: row.try_get("revision")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn message_from_row(row: &SqliteRow) -> AppResult<Message> {
    let role: String = row.try_get("role")?;
    Ok(Message {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        role: role.parse::<MessageRole>()?,
        content: row.try_get("content")?,
        is_deep: row.try_get("is_deep")?,
        emotional_intensity: row.try_get("emotional_intensity")?,
        affection_gained: row.try_get("affection_gained")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ChatStore for SqliteStore {
    async fn find_user_by_anonymous_id(&self, anonymous_id: &str) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE anonymous_id = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(anonymous_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_or_create_user(
        &self,
        anonymous_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<(User, bool)> {
        let result = sqlx::query(
            r"
            INSERT INTO users (
                anonymous_id, level, points, total_conversations, deep_conversations,
                consecutive_days, last_visit_date, community_unlocked, revision,
                created_at, updated_at
            )
            VALUES ($1, 1, 0, 0, 0, 1, $2, false, 0, $2, $2)
            ON CONFLICT(anonymous_id) DO NOTHING
            ",
        )
        .bind(anonymous_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        let created = result.rows_affected() == 1;
        let user = self
            .find_user_by_anonymous_id(anonymous_id)
            .await?
            .ok_or_else(|| deleted_user_error(anonymous_id))?;

        Ok((user, created))
    }

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_message(&self, message: NewMessage) -> AppResult<Message> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO messages (user_id, role, content, is_deep, emotional_intensity, \
             affection_gained, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING {MESSAGE_COLUMNS}"
        );

        let row = sqlx::query(&sql)
            .bind(message.user_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(message.is_deep)
            .bind(message.emotional_intensity)
            .bind(message.affection_gained)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert message: {e}")))?;

        message_from_row(&row)
    }

    async fn recent_messages(
        &self,
        user_id: i64,
        before_message_id: i64,
        limit: i64,
    ) -> AppResult<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE user_id = $1 AND id < $2 AND deleted_at IS NULL \
             ORDER BY created_at DESC, id DESC LIMIT $3"
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(before_message_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load history: {e}")))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn list_messages(&self, user_id: i64) -> AppResult<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE user_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at ASC, id ASC"
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list messages: {e}")))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn update_progress(&self, user: &User) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET level = $1, points = $2, total_conversations = $3, deep_conversations = $4,
                consecutive_days = $5, last_visit_date = $6, community_unlocked = $7,
                updated_at = $8, revision = revision + 1
            WHERE id = $9 AND revision = $10 AND deleted_at IS NULL
            ",
        )
        .bind(user.level)
        .bind(user.points)
        .bind(user.total_conversations)
        .bind(user.deep_conversations)
        .bind(user.consecutive_days)
        .bind(user.last_visit_date)
        .bind(user.community_unlocked)
        .bind(user.updated_at)
        .bind(user.id)
        .bind(user.revision)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update user progress: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database health check failed: {e}")))?;
        Ok(())
    }
}
