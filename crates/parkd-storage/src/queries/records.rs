// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking record queries: history, statistics, reporting windows, and
//! retention cleanup. Opening and closing records is transactional and
//! lives in `parkd-booking`.

use parkd_core::{BookingRecord, HistoryRow, ParkdError, UserStats};
use rusqlite::params;

use crate::database::Database;
use crate::models::ActivitySummary;

pub(crate) fn record_from_row(row: &rusqlite::Row<'_>) -> Result<BookingRecord, rusqlite::Error> {
    Ok(BookingRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        spot_id: row.get(2)?,
        vehicle: row.get(3)?,
        opened_at: row.get(4)?,
        closed_at: row.get(5)?,
        cost: row.get(6)?,
    })
}

const RECORD_COLUMNS: &str = "id, user_id, spot_id, vehicle, opened_at, closed_at, cost";

const HISTORY_SQL: &str = "SELECT r.id, r.spot_id, l.name, l.address, l.pincode,
            r.vehicle, r.opened_at, r.closed_at, r.cost
     FROM records r
     JOIN spots s ON s.id = r.spot_id
     JOIN lots l ON l.id = s.lot_id
     WHERE r.user_id = ?1";

fn history_from_row(row: &rusqlite::Row<'_>) -> Result<HistoryRow, rusqlite::Error> {
    Ok(HistoryRow {
        record_id: row.get(0)?,
        spot_id: row.get(1)?,
        lot_name: row.get(2)?,
        lot_address: row.get(3)?,
        lot_pincode: row.get(4)?,
        vehicle: row.get(5)?,
        opened_at: row.get(6)?,
        closed_at: row.get(7)?,
        cost: row.get(8)?,
    })
}

/// Get a booking record by ID.
pub async fn get_record(db: &Database, id: i64) -> Result<Option<BookingRecord>, ParkdError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], record_from_row);
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The user's currently open booking, if any. The schema enforces at most
/// one open record per user.
pub async fn open_record_for_user(
    db: &Database,
    user_id: i64,
) -> Result<Option<BookingRecord>, ParkdError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM records
                 WHERE user_id = ?1 AND closed_at IS NULL"
            ))?;
            let result = stmt.query_row(params![user_id], record_from_row);
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A user's booking history joined with lot details, newest first.
pub async fn history_for_user(
    db: &Database,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<HistoryRow>, ParkdError> {
    db.connection()
        .call(move |conn| {
            let sql = match limit {
                Some(_) => format!("{HISTORY_SQL} ORDER BY r.opened_at DESC LIMIT ?2"),
                None => format!("{HISTORY_SQL} ORDER BY r.opened_at DESC"),
            };
            let mut stmt = conn.prepare(&sql)?;
            let mut history = Vec::new();
            match limit {
                Some(n) => {
                    let rows = stmt.query_map(params![user_id, n], history_from_row)?;
                    for row in rows {
                        history.push(row?);
                    }
                }
                None => {
                    let rows = stmt.query_map(params![user_id], history_from_row)?;
                    for row in rows {
                        history.push(row?);
                    }
                }
            }
            Ok(history)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// History rows opened inside `[from_ts, to_ts)`, newest first. Used for
/// the monthly report window.
pub async fn history_between(
    db: &Database,
    user_id: i64,
    from_ts: &str,
    to_ts: &str,
) -> Result<Vec<HistoryRow>, ParkdError> {
    let from_ts = from_ts.to_string();
    let to_ts = to_ts.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{HISTORY_SQL} AND r.opened_at >= ?2 AND r.opened_at < ?3
                 ORDER BY r.opened_at DESC"
            ))?;
            let rows = stmt.query_map(params![user_id, from_ts, to_ts], history_from_row)?;
            let mut history = Vec::new();
            for row in rows {
                history.push(row?);
            }
            Ok(history)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate statistics over one user's bookings.
pub async fn user_stats(db: &Database, user_id: i64) -> Result<UserStats, ParkdError> {
    db.connection()
        .call(move |conn| {
            let stats = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN closed_at IS NULL THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN closed_at IS NOT NULL THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN closed_at IS NOT NULL THEN cost ELSE 0 END), 0)
                 FROM records WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserStats {
                        total_bookings: row.get(0)?,
                        active_bookings: row.get(1)?,
                        completed_bookings: row.get(2)?,
                        total_spent: row.get(3)?,
                    })
                },
            )?;
            Ok(stats)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregates over a user's bookings opened inside `[from_ts, to_ts)`,
/// for the monthly report body.
pub async fn activity_summary(
    db: &Database,
    user_id: i64,
    from_ts: &str,
    to_ts: &str,
) -> Result<ActivitySummary, ParkdError> {
    let from_ts = from_ts.to_string();
    let to_ts = to_ts.to_string();
    db.connection()
        .call(move |conn| {
            let (total_bookings, total_spent, total_hours): (i64, f64, f64) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(cost), 0),
                        COALESCE(SUM(CASE WHEN closed_at IS NOT NULL
                            THEN (julianday(closed_at) - julianday(opened_at)) * 24.0
                            ELSE 0 END), 0)
                 FROM records
                 WHERE user_id = ?1 AND opened_at >= ?2 AND opened_at < ?3",
                params![user_id, from_ts, to_ts],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

            let most_used_lot = {
                let mut stmt = conn.prepare(
                    "SELECT l.name
                     FROM records r
                     JOIN spots s ON s.id = r.spot_id
                     JOIN lots l ON l.id = s.lot_id
                     WHERE r.user_id = ?1 AND r.opened_at >= ?2 AND r.opened_at < ?3
                     GROUP BY l.id
                     ORDER BY COUNT(*) DESC, l.name ASC
                     LIMIT 1",
                )?;
                let result = stmt.query_row(params![user_id, from_ts, to_ts], |row| row.get(0));
                match result {
                    Ok(name) => Some(name),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };

            Ok(ActivitySummary {
                total_bookings,
                total_spent,
                total_hours,
                most_used_lot,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// IDs of users with at least one booking opened at or after `since_ts`.
/// The inactivity reminder skips these.
pub async fn user_ids_active_since(db: &Database, since_ts: &str) -> Result<Vec<i64>, ParkdError> {
    let since_ts = since_ts.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT DISTINCT user_id FROM records WHERE opened_at >= ?1")?;
            let rows = stmt.query_map(params![since_ts], |row| row.get(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete completed records closed before `cutoff_ts`. Open records are
/// never touched. Returns the number of rows removed.
pub async fn delete_closed_before(db: &Database, cutoff_ts: &str) -> Result<usize, ParkdError> {
    let cutoff_ts = cutoff_ts.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM records WHERE closed_at IS NOT NULL AND closed_at < ?1",
                params![cutoff_ts],
            )?;
            Ok(deleted)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
