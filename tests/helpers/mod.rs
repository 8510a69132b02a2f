// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the axum request/response testing utilities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
