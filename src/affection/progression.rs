// ABOUTME: Level progression from cumulative affection points and the community unlock rule
// ABOUTME: Provides level lookup, per-level progress, relationship stages, and turn application
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # Progression
//!
//! Levels come from a fixed ascending threshold table. A user's level is the
//! highest entry whose threshold does not exceed their points. Level 10 is the
//! cap; points keep accumulating past it. Community access opens at level 10
//! and is never withdrawn.

use serde::{Deserialize, Serialize};

use crate::constants::affection::{COMMUNITY_UNLOCK_LEVEL, LEVEL_THRESHOLDS, MAX_LEVEL, MIN_LEVEL};
use crate::models::User;

use super::classifier::Classification;

/// Level for a cumulative point total
///
/// Total over all inputs: anything below the first threshold, negative values
/// included, is level 1.
#[must_use]
pub fn level(points: i32) -> i32 {
    (MIN_LEVEL..=MAX_LEVEL)
        .zip(LEVEL_THRESHOLDS)
        .take_while(|&(_, threshold)| threshold <= points)
        .last()
        .map_or(MIN_LEVEL, |(reached, _)| reached)
}

/// Points required to reach `level`, clamped to the table
fn threshold_for(level: i32) -> i32 {
    let index = (level.clamp(MIN_LEVEL, MAX_LEVEL) - 1) as usize;
    LEVEL_THRESHOLDS[index]
}

/// Progress within the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Current level
    pub level: i32,
    /// Points earned since reaching the current level
    pub current: i32,
    /// Points between the current level and the next
    pub needed: i32,
    /// Floored percentage of `current / needed`
    pub percentage: i32,
}

/// Progress toward the next level for a point total
///
/// At the cap there is no next level, so the bar reports the full total
/// against the cap threshold as complete.
#[must_use]
pub fn level_progress(points: i32) -> LevelProgress {
    let current_level = level(points);
    if current_level >= MAX_LEVEL {
        return LevelProgress {
            level: current_level,
            current: points,
            needed: threshold_for(MAX_LEVEL),
            percentage: 100,
        };
    }

    let floor = threshold_for(current_level);
    let needed = threshold_for(current_level + 1) - floor;
    let current = (points - floor).max(0);

    LevelProgress {
        level: current_level,
        current,
        needed,
        percentage: current * 100 / needed,
    }
}

/// Relationship stage shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffectionStage {
    /// Levels 1-3
    Stranger,
    /// Levels 4-6
    GettingToKnow,
    /// Levels 7-9
    Friend,
    /// Level 10
    Trusted,
}

impl AffectionStage {
    /// Stage for a level
    #[must_use]
    pub const fn for_level(level: i32) -> Self {
        match level {
            i32::MIN..=3 => Self::Stranger,
            4..=6 => Self::GettingToKnow,
            7..=9 => Self::Friend,
            _ => Self::Trusted,
        }
    }

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stranger => "Stranger",
            Self::GettingToKnow => "Getting to know each other",
            Self::Friend => "Friend",
            Self::Trusted => "Trusted companion",
        }
    }
}

/// What a completed turn did to a user's progression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionOutcome {
    /// Level before the turn
    pub previous_level: i32,
    /// Level after the turn
    pub new_level: i32,
    /// Points after the turn
    pub new_points: i32,
    /// Whether this turn opened the community
    pub community_newly_unlocked: bool,
}

impl ProgressionOutcome {
    /// Whether the turn crossed at least one threshold
    #[must_use]
    pub const fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

/// Apply one classified turn to a user snapshot
///
/// Adds the award, counts the conversation, recomputes the level, and opens the
/// community once the unlock level is reached. An already-open community stays
/// open regardless of the resulting level.
pub fn apply_progression(user: &mut User, classification: &Classification) -> ProgressionOutcome {
    let previous_level = user.level;
    let was_unlocked = user.community_unlocked;

    user.points = user.points.saturating_add(classification.affection_gained);
    user.total_conversations = user.total_conversations.saturating_add(1);
    if classification.is_deep {
        user.deep_conversations = user.deep_conversations.saturating_add(1);
    }
    user.level = level(user.points);
    user.community_unlocked = was_unlocked || user.level >= COMMUNITY_UNLOCK_LEVEL;

    ProgressionOutcome {
        previous_level,
        new_level: user.level,
        new_points: user.points,
        community_newly_unlocked: !was_unlocked && user.community_unlocked,
    }
}
