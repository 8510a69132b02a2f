// ABOUTME: Domain service layer for business logic kept out of route handlers
// ABOUTME: Hosts the chat orchestrator that runs a full conversational turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! Domain service layer

/// Chat turn orchestration: persistence, provider call, progression
pub mod chat;

pub use chat::{ChatOutcome, ChatService};
