// ABOUTME: Cargo build script that tracks the embedded SQL migration directories
// ABOUTME: Forces a rebuild when a migration is added so sqlx::migrate! picks it up
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # Migration Tracker
//!
//! `sqlx::migrate!` embeds the contents of `migrations/` at compile time. Cargo
//! does not know about that directory, so adding a new migration file without
//! touching any Rust source would leave a stale migrator in the binary.

fn main() {
    println!("cargo:rerun-if-changed=migrations/sqlite");
    println!("cargo:rerun-if-changed=migrations/postgres");
}
