// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lot capacity changes: resizing the spot count and deactivating lots.
//!
//! Spots are soft-deleted so that billing history keeps valid spot
//! references. Shrinking removes trailing spots first and refuses to
//! remove an occupied one; growing revives soft-deleted spots before
//! minting new labels.

use parkd_core::{Lot, ParkdError, now_ts};
use parkd_storage::Database;
use rusqlite::params;

fn lot_from_row(row: &rusqlite::Row<'_>) -> Result<Lot, rusqlite::Error> {
    Ok(Lot {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        pincode: row.get(3)?,
        hourly_rate: row.get(4)?,
        declared_spots: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const LOT_SQL: &str = "SELECT id, name, address, pincode, hourly_rate, declared_spots,
            is_active, created_at
     FROM lots WHERE id = ?1";

/// Change a lot's spot count to `new_count`.
pub async fn resize_lot(db: &Database, lot_id: i64, new_count: i64) -> Result<Lot, ParkdError> {
    if new_count < 1 {
        return Err(ParkdError::Validation(
            "a lot must have at least one spot".to_string(),
        ));
    }
    let result = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let lot = {
                let result = tx.query_row(LOT_SQL, params![lot_id], lot_from_row);
                match result {
                    Ok(lot) => lot,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Ok(Err(ParkdError::NotFound(format!("lot {lot_id}"))));
                    }
                    Err(e) => return Err(e.into()),
                }
            };
            if !lot.is_active {
                return Ok(Err(ParkdError::Conflict(format!(
                    "lot {lot_id} is deactivated"
                ))));
            }

            let current: i64 = tx.query_row(
                "SELECT COUNT(*) FROM spots WHERE lot_id = ?1 AND is_active = 1",
                params![lot_id],
                |row| row.get(0),
            )?;

            if new_count < current {
                // Shrink: drop trailing spots, newest first, free only.
                let to_remove = current - new_count;
                let victims: Vec<i64> = {
                    let mut stmt = tx.prepare(
                        "SELECT id FROM spots
                         WHERE lot_id = ?1 AND is_active = 1 AND status = 'free'
                         ORDER BY id DESC LIMIT ?2",
                    )?;
                    let rows = stmt.query_map(params![lot_id, to_remove], |row| row.get(0))?;
                    let mut ids = Vec::new();
                    for row in rows {
                        ids.push(row?);
                    }
                    ids
                };
                if (victims.len() as i64) < to_remove {
                    return Ok(Err(ParkdError::Conflict(format!(
                        "cannot shrink lot {lot_id} to {new_count}: occupied spots in the way"
                    ))));
                }
                for id in victims {
                    tx.execute("UPDATE spots SET is_active = 0 WHERE id = ?1", params![id])?;
                }
            } else if new_count > current {
                // Grow: revive soft-deleted spots first, then mint new labels.
                let mut needed = new_count - current;
                let revivable: Vec<i64> = {
                    let mut stmt = tx.prepare(
                        "SELECT id FROM spots WHERE lot_id = ?1 AND is_active = 0
                         ORDER BY id ASC LIMIT ?2",
                    )?;
                    let rows = stmt.query_map(params![lot_id, needed], |row| row.get(0))?;
                    let mut ids = Vec::new();
                    for row in rows {
                        ids.push(row?);
                    }
                    ids
                };
                for id in revivable {
                    tx.execute(
                        "UPDATE spots SET is_active = 1, status = 'free' WHERE id = ?1",
                        params![id],
                    )?;
                    needed -= 1;
                }
                if needed > 0 {
                    let max_label: i64 = tx.query_row(
                        "SELECT COALESCE(MAX(CAST(label AS INTEGER)), 0)
                         FROM spots WHERE lot_id = ?1",
                        params![lot_id],
                        |row| row.get(0),
                    )?;
                    let created_at = now_ts();
                    for n in 1..=needed {
                        tx.execute(
                            "INSERT INTO spots (lot_id, label, status, is_active, created_at)
                             VALUES (?1, ?2, 'free', 1, ?3)",
                            params![lot_id, (max_label + n).to_string(), created_at],
                        )?;
                    }
                }
            }

            tx.execute(
                "UPDATE lots SET declared_spots = ?1 WHERE id = ?2",
                params![new_count, lot_id],
            )?;
            tx.commit()?;
            Ok(Ok(Lot {
                declared_spots: new_count,
                ..lot
            }))
        })
        .await
        .map_err(parkd_storage::map_tr_err)?;
    result
}

/// Deactivate a lot, retiring all of its spots.
///
/// Refused while any spot is occupied. Deactivated lots keep their
/// history but stop appearing in availability listings and reject new
/// bookings.
pub async fn deactivate_lot(db: &Database, lot_id: i64) -> Result<Lot, ParkdError> {
    let result = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let lot = {
                let result = tx.query_row(LOT_SQL, params![lot_id], lot_from_row);
                match result {
                    Ok(lot) => lot,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Ok(Err(ParkdError::NotFound(format!("lot {lot_id}"))));
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            let occupied: i64 = tx.query_row(
                "SELECT COUNT(*) FROM spots
                 WHERE lot_id = ?1 AND is_active = 1 AND status = 'occupied'",
                params![lot_id],
                |row| row.get(0),
            )?;
            if occupied > 0 {
                return Ok(Err(ParkdError::Conflict(format!(
                    "lot {lot_id} still has {occupied} occupied spots"
                ))));
            }

            tx.execute(
                "UPDATE spots SET is_active = 0 WHERE lot_id = ?1",
                params![lot_id],
            )?;
            tx.execute(
                "UPDATE lots SET is_active = 0 WHERE id = ?1",
                params![lot_id],
            )?;
            tx.commit()?;
            Ok(Ok(Lot {
                is_active: false,
                ..lot
            }))
        })
        .await
        .map_err(parkd_storage::map_tr_err)?;
    result
}
