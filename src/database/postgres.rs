// ABOUTME: PostgreSQL implementation of the chat store
// ABOUTME: Mirrors the SQLite store for server deployments behind the postgresql feature
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;

use super::{deleted_user_error, ChatStore};
use crate::errors::{AppError, AppResult};
use crate::models::{Message, MessageRole, NewMessage, User};

const USER_COLUMNS: &str = "id, anonymous_id, level, points, total_conversations, \
     deep_conversations, consecutive_days, last_visit_date, community_unlocked, revision, \
     created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, user_id, role, content, is_deep, emotional_intensity, \
     affection_gained, created_at, updated_at";

/// Maximum pooled connections to the server
const MAX_CONNECTIONS: u32 = 10;

/// `PostgreSQL`-backed chat store
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Open a pool to the server at `connection_string`
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached
    pub async fn connect(connection_string: &str) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(connection_string)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to PostgreSQL: {e}")))?;

        Ok(Self { pool })
    }

    /// Apply embedded `PostgreSQL` migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails to apply
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations/postgres")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to run migrations: {e}")))?;
        debug!("PostgreSQL migrations applied");
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> AppResult<User> {
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

fn message_from_row(row: &PgRow) -> AppResult<Message> {
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
impl ChatStore for PostgresStore {
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
            ON CONFLICT (anonymous_id) DO NOTHING
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
            .bind(Utc::now())
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
