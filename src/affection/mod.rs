// ABOUTME: Affection progression domain: levels, rewards, message classification, visit streaks
// ABOUTME: Pure functions consulted by the chat orchestrator after every completed turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # Affection Progression
//!
//! Everything in this module is pure and deterministic. The chat service feeds
//! it the inbound message text, the user's snapshot, and the current time, and
//! writes back whatever it returns.
//!
//! - [`classifier`] decides whether an exchange is deep and scores its intensity
//! - [`rules`] turns that classification into a point award
//! - [`progression`] maps cumulative points to levels, stages, and unlocks
//! - [`visits`] maintains the consecutive-day streak

pub mod classifier;
pub mod progression;
pub mod rules;
pub mod visits;

pub use classifier::{emotional_intensity, is_deep, Classification};
pub use progression::{
    apply_progression, level, level_progress, AffectionStage, LevelProgress, ProgressionOutcome,
};
pub use rules::{affection, AffectionReason};
pub use visits::{next_streak, record_visit};
