//! Shared test helpers for `rendezvous-core` integration tests.
//!
//! Lightweight in-memory stand-ins for every port so tests can focus on
//! dialogue and scheduling behaviour.

#![allow(dead_code)]

pub mod calendar;
pub mod conversation;

use chrono::{DateTime, TimeZone, Utc};

/// Fixed instant on 2026-05-04 (a Monday) at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, hour, minute, 0).single().expect("valid test instant")
}
