// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting-window arithmetic, all in UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use parkd_core::format_ts;

/// Midnight UTC of the day containing `now`, as a canonical timestamp.
pub fn start_of_day(now: DateTime<Utc>) -> String {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    format_ts(Utc.from_utc_datetime(&midnight))
}

/// The previous calendar month as `(from, to, label)`: a half-open
/// timestamp interval and a human-readable label like "March 2026".
pub fn previous_month_window(now: DateTime<Utc>) -> (String, String, String) {
    let this_month_start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .unwrap_or_else(|| now.date_naive());
    let last_month_end = this_month_start.pred_opt().unwrap_or(this_month_start);
    let last_month_start =
        NaiveDate::from_ymd_opt(last_month_end.year(), last_month_end.month(), 1)
            .unwrap_or(last_month_end);

    let from = Utc.from_utc_datetime(&last_month_start.and_time(NaiveTime::MIN));
    let to = Utc.from_utc_datetime(&this_month_start.and_time(NaiveTime::MIN));
    let label = from.format("%B %Y").to_string();
    (format_ts(from), format_ts(to), label)
}
