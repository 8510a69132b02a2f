// ABOUTME: System prompts for the companion persona loaded at compile time
// ABOUTME: Selects a relationship framing from the user's current level
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # System Prompts
//!
//! The persona text lives in a markdown file next to this module so it can be
//! edited without touching code. Every conversation starts with the persona
//! followed by one line describing how close the user and the fairy are.

use crate::constants::affection::{DEVELOPING_RELATIONSHIP_LEVEL, ESTABLISHED_RELATIONSHIP_LEVEL};

/// Base persona for the fairy companion
pub const FAIRY_PERSONA_PROMPT: &str = include_str!("fairy_persona.md");

/// Framing for levels 7 and above
pub const ESTABLISHED_RELATIONSHIP: &str =
    "현재 관계: 서로 친구가 되어 편하게 대화할 수 있습니다. 좀 더 깊이 있는 질문과 조언을 해주세요.";

/// Framing for levels 4 to 6
pub const DEVELOPING_RELATIONSHIP: &str =
    "현재 관계: 서로 알아가는 중입니다. 점진적으로 신뢰를 쌓아가세요.";

/// Framing for levels below 4
pub const FIRST_CONTACT_RELATIONSHIP: &str =
    "현재 관계: 처음 만났습니다. 부드럽게 다가가며 신뢰를 쌓으세요.";

/// Relationship framing line for a level
#[must_use]
pub const fn relationship_framing(level: i32) -> &'static str {
    if level >= ESTABLISHED_RELATIONSHIP_LEVEL {
        ESTABLISHED_RELATIONSHIP
    } else if level >= DEVELOPING_RELATIONSHIP_LEVEL {
        DEVELOPING_RELATIONSHIP
    } else {
        FIRST_CONTACT_RELATIONSHIP
    }
}

/// Full system instruction for a user at `level`
#[must_use]
pub fn build_system_prompt(level: i32) -> String {
    format!(
        "{}\n{}",
        FAIRY_PERSONA_PROMPT.trim_end(),
        relationship_framing(level)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_thresholds() {
        assert_eq!(relationship_framing(1), FIRST_CONTACT_RELATIONSHIP);
        assert_eq!(relationship_framing(3), FIRST_CONTACT_RELATIONSHIP);
        assert_eq!(relationship_framing(4), DEVELOPING_RELATIONSHIP);
        assert_eq!(relationship_framing(6), DEVELOPING_RELATIONSHIP);
        assert_eq!(relationship_framing(7), ESTABLISHED_RELATIONSHIP);
        assert_eq!(relationship_framing(10), ESTABLISHED_RELATIONSHIP);
    }

    #[test]
    fn test_prompt_is_persona_plus_framing() {
        let prompt = build_system_prompt(5);
        assert!(prompt.starts_with(FAIRY_PERSONA_PROMPT.trim_end()));
        assert!(prompt.ends_with(DEVELOPING_RELATIONSHIP));
        assert_eq!(build_system_prompt(5), prompt);
    }
}
