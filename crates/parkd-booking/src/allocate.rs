// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking creation: pick the first free spot in a lot and open a record.

use parkd_core::{BookingRecord, ParkdError, now_ts};
use parkd_storage::Database;
use rusqlite::params;

/// Normalize a vehicle registration: trim, uppercase, at least three
/// characters.
pub fn normalize_vehicle(raw: &str) -> Result<String, ParkdError> {
    let vehicle = raw.trim().to_uppercase();
    if vehicle.len() < 3 {
        return Err(ParkdError::Validation(
            "vehicle number must be at least 3 characters".to_string(),
        ));
    }
    Ok(vehicle)
}

/// Book a spot in `lot_id` for `user_id`.
///
/// Allocates the free active spot with the lowest ID, marks it occupied
/// and opens a booking record, all in one transaction. A user can hold
/// at most one open booking.
pub async fn book(
    db: &Database,
    user_id: i64,
    lot_id: i64,
    vehicle: &str,
) -> Result<BookingRecord, ParkdError> {
    let vehicle = normalize_vehicle(vehicle)?;
    let result = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let user_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                params![user_id],
                |row| row.get(0),
            )?;
            if !user_exists {
                return Ok(Err(ParkdError::NotFound(format!("user {user_id}"))));
            }

            let has_open: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM records WHERE user_id = ?1 AND closed_at IS NULL)",
                params![user_id],
                |row| row.get(0),
            )?;
            if has_open {
                return Ok(Err(ParkdError::Conflict(
                    "user already has an active booking".to_string(),
                )));
            }

            // A deactivated lot is indistinguishable from a missing one.
            let lot_active: Option<bool> = {
                let result = tx.query_row(
                    "SELECT is_active FROM lots WHERE id = ?1",
                    params![lot_id],
                    |row| row.get(0),
                );
                match result {
                    Ok(active) => Some(active),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };
            if lot_active != Some(true) {
                return Ok(Err(ParkdError::NotFound(format!("lot {lot_id}"))));
            }

            let spot_id: Option<i64> = {
                let result = tx.query_row(
                    "SELECT id FROM spots
                     WHERE lot_id = ?1 AND status = 'free' AND is_active = 1
                     ORDER BY id ASC LIMIT 1",
                    params![lot_id],
                    |row| row.get(0),
                );
                match result {
                    Ok(id) => Some(id),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };
            let spot_id = match spot_id {
                Some(id) => id,
                None => {
                    return Ok(Err(ParkdError::Capacity(format!(
                        "no free spots in lot {lot_id}"
                    ))));
                }
            };

            tx.execute(
                "UPDATE spots SET status = 'occupied' WHERE id = ?1",
                params![spot_id],
            )?;
            let opened_at = now_ts();
            tx.execute(
                "INSERT INTO records (user_id, spot_id, vehicle, opened_at, closed_at, cost)
                 VALUES (?1, ?2, ?3, ?4, NULL, 0)",
                params![user_id, spot_id, vehicle, opened_at],
            )?;
            let record_id = tx.last_insert_rowid();
            tx.commit()?;

            Ok(Ok(BookingRecord {
                id: record_id,
                user_id,
                spot_id,
                vehicle,
                opened_at,
                closed_at: None,
                cost: 0.0,
            }))
        })
        .await
        .map_err(parkd_storage::map_tr_err)?;
    result
}
