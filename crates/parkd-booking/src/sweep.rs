// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expiry sweep: force-close bookings that have been open too long.

use parkd_core::{ParkdError, format_ts, now_ts};
use parkd_storage::Database;
use rusqlite::params;

use crate::billing::parking_cost;

/// Close every booking that has been open for more than
/// `threshold_hours`, billing each to the sweep time at its lot's
/// current rate, and free the spots. Returns the number of bookings
/// closed. Running the sweep twice in a row is a no-op the second time.
pub async fn sweep_expired(db: &Database, threshold_hours: i64) -> Result<usize, ParkdError> {
    let cutoff = format_ts(chrono::Utc::now() - chrono::Duration::hours(threshold_hours));
    let swept = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let expired: Vec<(i64, i64, String, f64)> = {
                let mut stmt = tx.prepare(
                    "SELECT r.id, r.spot_id, r.opened_at, l.hourly_rate
                     FROM records r
                     JOIN spots s ON s.id = r.spot_id
                     JOIN lots l ON l.id = s.lot_id
                     WHERE r.closed_at IS NULL AND r.opened_at < ?1",
                )?;
                let rows = stmt.query_map(params![cutoff], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?;
                let mut expired = Vec::new();
                for row in rows {
                    expired.push(row?);
                }
                expired
            };

            let closed_at = now_ts();
            for (record_id, spot_id, opened_at, hourly_rate) in &expired {
                let cost = parking_cost(opened_at, &closed_at, *hourly_rate);
                tx.execute(
                    "UPDATE records SET closed_at = ?1, cost = ?2 WHERE id = ?3",
                    params![closed_at, cost, record_id],
                )?;
                tx.execute(
                    "UPDATE spots SET status = 'free' WHERE id = ?1",
                    params![spot_id],
                )?;
            }
            tx.commit()?;
            Ok(expired.len())
        })
        .await
        .map_err(parkd_storage::map_tr_err)?;

    if swept > 0 {
        tracing::info!(swept, threshold_hours, "closed expired bookings");
    }
    Ok(swept)
}
