// ABOUTME: Shared server resources injected into every route handler
// ABOUTME: Bundles the chat store, chat service, and configuration behind Arcs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::database::ChatStore;
use crate::llm::LlmProvider;
use crate::services::ChatService;

/// Dependencies shared by all handlers
///
/// Built once at startup (or per test) and passed to routers as
/// `Arc<ServerResources>` state.
#[derive(Clone)]
pub struct ServerResources {
    /// User and message storage
    pub store: Arc<dyn ChatStore>,
    /// Chat turn orchestrator over `store` and the model provider
    pub chat: ChatService,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire the chat service from its dependencies and configuration
    #[must_use]
    pub fn new(
        store: Arc<dyn ChatStore>,
        llm: Arc<dyn LlmProvider>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let chat = ChatService::new(
            Arc::clone(&store),
            llm,
            config.chat.history_window,
            config.llm.timeout,
        );

        Self {
            store,
            chat,
            config,
        }
    }
}
