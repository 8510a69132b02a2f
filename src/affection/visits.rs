// ABOUTME: Consecutive-visit streak tracking based on UTC calendar days
// ABOUTME: Same-day visits keep the streak, next-day visits extend it, longer gaps reset it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

use chrono::{DateTime, Utc};

use crate::models::User;

/// Streak after a visit at `now`, given the previous visit
#[must_use]
pub fn next_streak(current: i32, last_visit: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    let gap = (now.date_naive() - last_visit.date_naive()).num_days();
    match gap {
        i64::MIN..=0 => current.max(1),
        1 => current.saturating_add(1),
        _ => 1,
    }
}

/// Record a chat visit on the user snapshot
pub fn record_visit(user: &mut User, now: DateTime<Utc>) {
    user.consecutive_days = next_streak(user.consecutive_days, user.last_visit_date, now);
    user.last_visit_date = user.last_visit_date.max(now);
}
