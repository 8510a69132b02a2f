// ABOUTME: Heuristic conversation classifier for depth and emotional intensity
// ABOUTME: Depth is a character-length threshold; intensity is a fixed placeholder score
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

use crate::constants::affection::{DEEP_MESSAGE_MIN_CHARS, DEFAULT_EMOTIONAL_INTENSITY};

use super::rules::affection;

/// Classification of a single exchange, stored on the model's reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether the inbound message counts as a deep conversation
    pub is_deep: bool,
    /// Emotional intensity score (0-100)
    pub emotional_intensity: i32,
    /// Points awarded for the exchange
    pub affection_gained: i32,
}

impl Classification {
    /// Classify an inbound message
    #[must_use]
    pub fn of(message: &str) -> Self {
        let deep = is_deep(message);
        Self {
            is_deep: deep,
            emotional_intensity: emotional_intensity(message),
            affection_gained: affection(deep),
        }
    }
}

/// A message is deep when it is longer than the threshold, counted in characters
#[must_use]
pub fn is_deep(message: &str) -> bool {
    message.chars().count() > DEEP_MESSAGE_MIN_CHARS
}

/// Emotional intensity of a message
///
/// Always the neutral midpoint. The score is persisted for later analysis but
/// does not influence the reward.
#[must_use]
pub const fn emotional_intensity(_message: &str) -> i32 {
    DEFAULT_EMOTIONAL_INTENSITY
}
