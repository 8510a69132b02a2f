// ABOUTME: Affection reward rule mapping a classified exchange to a point award
// ABOUTME: Rewards are expressed through the AffectionReason enum
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

use serde::{Deserialize, Serialize};

use crate::constants::affection::{DAILY_CONVERSATION_POINTS, DEEP_CONVERSATION_POINTS};

/// Why affection points were awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffectionReason {
    /// Any completed exchange
    DailyConversation,
    /// An exchange whose inbound message was classified deep
    DeepConversation,
}

impl AffectionReason {
    /// Reason for an exchange with the given depth
    #[must_use]
    pub const fn for_depth(is_deep: bool) -> Self {
        if is_deep {
            Self::DeepConversation
        } else {
            Self::DailyConversation
        }
    }

    /// Points awarded for this reason
    #[must_use]
    pub const fn points(self) -> i32 {
        match self {
            Self::DailyConversation => DAILY_CONVERSATION_POINTS,
            Self::DeepConversation => DEEP_CONVERSATION_POINTS,
        }
    }
}

/// Points awarded for one exchange
#[must_use]
pub const fn affection(is_deep: bool) -> i32 {
    AffectionReason::for_depth(is_deep).points()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affection_awards() {
        assert_eq!(affection(true), 15);
        assert_eq!(affection(false), 5);
    }

    #[test]
    fn test_reason_serialization() {
        let json = serde_json::to_string(&AffectionReason::DeepConversation).unwrap();
        assert_eq!(json, "\"deep_conversation\"");
    }
}
