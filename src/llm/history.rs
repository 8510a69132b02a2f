// ABOUTME: Conversation history windowing and model context assembly
// ABOUTME: Keeps the most recent turns in chronological order behind a single system instruction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # History Windowing
//!
//! Storage hands back recent messages newest first. The model wants them
//! oldest first, capped, preceded by the system instruction and followed by
//! the message being answered.

use crate::models::{Message, MessageRole as StoredRole};

use super::ChatMessage;

/// The most recent `cap` turns of a chronologically ordered history
///
/// Order is preserved. A history shorter than `cap` is returned whole.
#[must_use]
pub fn window_history<T>(turns: &[T], cap: usize) -> &[T] {
    &turns[turns.len().saturating_sub(cap)..]
}

/// Map a stored message onto a provider message
///
/// Only the fairy speaks as the assistant; anything else is sent as user text.
#[must_use]
pub fn to_chat_message(message: &Message) -> ChatMessage {
    match message.role {
        StoredRole::Fairy => ChatMessage::assistant(message.content.clone()),
        StoredRole::User | StoredRole::System => ChatMessage::user(message.content.clone()),
    }
}

/// Assemble the full provider context for one turn
///
/// `recent_newest_first` is the stored history as fetched (descending by
/// creation time) and must not contain the inbound message itself.
#[must_use]
pub fn build_context(
    system_prompt: String,
    mut recent_newest_first: Vec<Message>,
    cap: usize,
    inbound: &str,
) -> Vec<ChatMessage> {
    recent_newest_first.reverse();
    let window = window_history(&recent_newest_first, cap);

    let mut messages = Vec::with_capacity(window.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(window.iter().map(to_chat_message));
    messages.push(ChatMessage::user(inbound));
    messages
}
