// ABOUTME: HTTP route definitions grouped by domain
// ABOUTME: Health, chat, and user routers merged by the server into one application
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! Route modules
//!
//! Each domain exposes a `*Routes` type whose `routes` function returns a
//! router already bound to the shared [`ServerResources`](crate::resources::ServerResources).

/// Chat turn endpoint
pub mod chat;
/// Liveness and readiness endpoints
pub mod health;
/// User profile, history, and progress endpoints
pub mod users;

pub use chat::{ChatMessageRequest, ChatMessageResponse, ChatRoutes};
pub use health::HealthRoutes;
pub use users::{ProgressResponse, UserRoutes};
