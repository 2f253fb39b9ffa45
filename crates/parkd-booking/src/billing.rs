// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing rules.
//!
//! Cost is `max(duration_hours, 0.1) * hourly_rate`, rounded to two
//! decimals. The 0.1-hour floor means even a one-minute stay is billed
//! for six minutes.

use parkd_core::parse_ts;

/// Minimum billable duration in hours.
pub const MIN_BILLABLE_HOURS: f64 = 0.1;

/// Round a currency amount to two decimal places.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Billable duration in hours for the interval `[opened_at, closed_at]`.
///
/// Applies the minimum floor. A malformed or inverted interval also
/// collapses to the floor rather than producing a negative charge.
pub fn billable_hours(opened_at: &str, closed_at: &str) -> f64 {
    let elapsed = match (parse_ts(opened_at), parse_ts(closed_at)) {
        (Some(opened), Some(closed)) => {
            (closed - opened).num_milliseconds() as f64 / 3_600_000.0
        }
        _ => 0.0,
    };
    elapsed.max(MIN_BILLABLE_HOURS)
}

/// Total cost of a stay.
pub fn parking_cost(opened_at: &str, closed_at: &str, hourly_rate: f64) -> f64 {
    round2(billable_hours(opened_at, closed_at) * hourly_rate)
}
