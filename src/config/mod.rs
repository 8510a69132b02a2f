// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Re-exports the environment-driven server configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! Configuration module for the Saedam API
//!
//! All settings come from environment variables (optionally seeded from a
//! `.env` file). See [`environment::ServerConfig::from_env`].

/// Environment and server configuration
pub mod environment;

pub use environment::{
    ChatConfig, CorsConfig, DatabaseConfig, DatabaseUrl, Environment, LlmConfig, ServerConfig,
};
