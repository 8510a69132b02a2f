// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database location, CORS origins, and model provider settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! Environment-based configuration management for production deployment

use crate::constants::{defaults, limits};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Environment type for logging and other deployment-dependent behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// `PostgreSQL` connection
    PostgreSQL {
        /// Full connection string including credentials
        connection_string: String,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            if path_str == ":memory:" {
                Self::Memory
            } else {
                Self::SQLite {
                    path: PathBuf::from(path_str.trim_start_matches("//")),
                }
            }
        } else if s.starts_with("postgresql://") || s.starts_with("postgres://") {
            Self::PostgreSQL {
                connection_string: s.to_owned(),
            }
        } else {
            // Bare paths are treated as SQLite files
            Self::SQLite {
                path: PathBuf::from(s),
            }
        }
    }

    /// Assemble a `PostgreSQL` URL from discrete connection parameters
    #[must_use]
    pub fn postgres_from_parts(
        host: &str,
        user: &str,
        password: &str,
        name: &str,
        port: u16,
    ) -> Self {
        let credentials = if password.is_empty() {
            urlencoding::encode(user).into_owned()
        } else {
            format!(
                "{}:{}",
                urlencoding::encode(user),
                urlencoding::encode(password)
            )
        };
        Self::PostgreSQL {
            connection_string: format!("postgres://{credentials}@{host}:{port}/{name}"),
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::PostgreSQL { connection_string } => connection_string.clone(),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Connection string with any password replaced, for logs
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Self::PostgreSQL { connection_string } => {
                let Some((scheme, rest)) = connection_string.split_once("://") else {
                    return connection_string.clone();
                };
                match rest.rsplit_once('@') {
                    Some((credentials, location)) => {
                        let user = credentials.split(':').next().unwrap_or_default();
                        format!("{scheme}://{user}:***@{location}")
                    }
                    None => connection_string.clone(),
                }
            }
            other => other.to_connection_string(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }

    /// Check if this is a `SQLite` database
    #[must_use]
    pub const fn is_sqlite(&self) -> bool {
        matches!(self, Self::SQLite { .. } | Self::Memory)
    }

    /// Check if this is a `PostgreSQL` database
    #[must_use]
    pub const fn is_postgresql(&self) -> bool {
        matches!(self, Self::PostgreSQL { .. })
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(defaults::DATABASE_URL)
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Model provider configuration
    pub llm: LlmConfig,
    /// Conversation behavior
    pub chat: ChatConfig,
}

/// Database connection and migration settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Where the data lives
    pub url: DatabaseUrl,
    /// Startup connection attempts before the process gives up
    pub connect_max_attempts: u32,
    /// Delay between startup connection attempts
    pub connect_retry_delay: Duration,
    /// Apply pending migrations when the server starts
    pub auto_migrate: bool,
}

/// Cross-origin settings
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated allowed origins, or `*`
    pub allowed_origins: String,
}

/// Model provider settings
#[derive(Clone)]
pub struct LlmConfig {
    /// Provider API key
    pub api_key: String,
    /// Chat model name
    pub model: String,
    /// Base URL of the `OpenAI`-compatible API
    pub base_url: String,
    /// Upper bound on a single completion call
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    /// Check that the provider can be called
    ///
    /// Only serving needs this; migrations run without provider credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is missing or blank
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow!("OPENAI_API_KEY is not set"));
        }
        Ok(())
    }
}

/// Conversation behavior settings
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Most recent turns forwarded to the model
    pub history_window: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: limits::DEFAULT_HISTORY_WINDOW,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed or a value is
    /// out of range
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is missing or malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            http_port: parse_or(&var, "PORT", defaults::HTTP_PORT)?,
            host: var("HOST").unwrap_or_else(|| defaults::HOST.to_owned()),
            environment: var("ENVIRONMENT")
                .map(|e| Environment::from_str_or_default(&e))
                .unwrap_or_default(),
            database: DatabaseConfig {
                url: database_url(&var)?,
                connect_max_attempts: parse_or(
                    &var,
                    "DB_CONNECT_MAX_ATTEMPTS",
                    defaults::DB_CONNECT_MAX_ATTEMPTS,
                )?,
                connect_retry_delay: Duration::from_secs(parse_or(
                    &var,
                    "DB_CONNECT_RETRY_DELAY_SECS",
                    defaults::DB_CONNECT_RETRY_DELAY_SECS,
                )?),
                auto_migrate: parse_or(&var, "AUTO_MIGRATE", false)?,
            },
            cors: CorsConfig {
                allowed_origins: var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|| defaults::ALLOWED_ORIGINS.to_owned()),
            },
            llm: LlmConfig {
                api_key: var("OPENAI_API_KEY").unwrap_or_default(),
                model: var("OPENAI_MODEL").unwrap_or_else(|| defaults::OPENAI_MODEL.to_owned()),
                base_url: var("OPENAI_BASE_URL")
                    .unwrap_or_else(|| defaults::OPENAI_BASE_URL.to_owned()),
                timeout: Duration::from_secs(parse_or(
                    &var,
                    "PROVIDER_TIMEOUT_SECS",
                    limits::DEFAULT_PROVIDER_TIMEOUT_SECS,
                )?),
            },
            chat: ChatConfig {
                history_window: parse_or(
                    &var,
                    "HISTORY_WINDOW",
                    limits::DEFAULT_HISTORY_WINDOW,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            return Err(anyhow!("PORT must be greater than zero"));
        }
        if self.database.connect_max_attempts == 0 {
            return Err(anyhow!("DB_CONNECT_MAX_ATTEMPTS must be at least 1"));
        }
        if self.llm.timeout.is_zero() {
            return Err(anyhow!("PROVIDER_TIMEOUT_SECS must be greater than zero"));
        }
        if self.chat.history_window == 0 {
            return Err(anyhow!("HISTORY_WINDOW must be at least 1"));
        }
        Ok(())
    }

    /// Allowed CORS origins as a list (`*` stays a single entry)
    #[must_use]
    pub fn allowed_origins(&self) -> Vec<String> {
        parse_origins(&self.cors.allowed_origins)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Saedam API Configuration:\n\
             - Environment: {}\n\
             - Listen: {}:{}\n\
             - Database: {}\n\
             - Auto Migrate: {}\n\
             - CORS Origins: {}\n\
             - Model: {} via {}\n\
             - Provider Timeout: {}s\n\
             - History Window: {}",
            self.environment,
            self.host,
            self.http_port,
            self.database.url.redacted(),
            self.database.auto_migrate,
            self.cors.allowed_origins,
            self.llm.model,
            self.llm.base_url,
            self.llm.timeout.as_secs(),
            self.chat.history_window,
        )
    }
}

/// Resolve the database location: `DATABASE_URL`, then `DB_*` parts, then local `SQLite`
fn database_url<F>(var: &F) -> Result<DatabaseUrl>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = var("DATABASE_URL") {
        return Ok(DatabaseUrl::parse_url(&url));
    }

    if let Some(host) = var("DB_HOST") {
        let port = parse_or(var, "DB_PORT", defaults::POSTGRES_PORT)?;
        return Ok(DatabaseUrl::postgres_from_parts(
            &host,
            &var("DB_USER").unwrap_or_default(),
            &var("DB_PASSWORD").unwrap_or_default(),
            &var("DB_NAME").unwrap_or_default(),
            port,
        ));
    }

    Ok(DatabaseUrl::default())
}

/// Parse an optional variable, falling back to a default when absent
fn parse_or<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}"))
    })
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
