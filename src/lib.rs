// ABOUTME: Main library entry point for the Saedam companion chat API
// ABOUTME: Exposes the affection progression engine, storage, model provider, and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Saedam Server
//!
//! Backend for a chat-based companion application. A parent talks to a fairy
//! persona backed by a third-party language model; every exchange is stored and
//! feeds a gamified affection progression (points, levels, community unlock)
//! attached to an anonymous user profile.
//!
//! ## Architecture
//!
//! - **`affection`**: pure progression rules (levels, rewards, classification, visit streaks)
//! - **`llm`**: model provider trait, `OpenAI`-compatible client, prompts, history windowing
//! - **`database`**: `ChatStore` trait with `SQLite` and `PostgreSQL` backends and embedded migrations
//! - **`services`**: the chat orchestrator sequencing one conversation turn
//! - **`routes`**: axum handlers for the `/api/v1` surface
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use saedam_server::config::environment::ServerConfig;
//! use saedam_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Saedam API configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Affection progression rules: levels, rewards, classifier, visit streaks
pub mod affection;

/// Configuration management
pub mod config;

/// Application constants and defaults
pub mod constants;

/// Persistent storage for users and messages
pub mod database;

/// Unified error handling with error codes and HTTP responses
pub mod errors;

/// Language model provider abstraction
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware (CORS)
pub mod middleware;

/// Domain models for users and messages
pub mod models;

/// Shared server resources injected into handlers
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Business services orchestrating storage and the model provider
pub mod services;
