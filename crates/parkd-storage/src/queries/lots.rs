// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lot CRUD and availability queries.
//!
//! Lot creation seeds one spot row per declared spot in the same
//! transaction. Capacity changes after creation go through the resize and
//! deactivate operations in `parkd-booking`.

use parkd_core::{AdminSummary, Lot, LotAvailability, ParkdError, now_ts};
use rusqlite::params;

use crate::database::Database;
use crate::models::{LotChanges, NewLot};

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

const LOT_COLUMNS: &str =
    "id, name, address, pincode, hourly_rate, declared_spots, is_active, created_at";

const AVAILABILITY_SQL: &str = "SELECT l.id, l.name, l.address, l.pincode, l.hourly_rate,
            COUNT(s.id) AS total,
            COALESCE(SUM(CASE WHEN s.status = 'occupied' THEN 1 ELSE 0 END), 0) AS occupied
     FROM lots l
     LEFT JOIN spots s ON s.lot_id = l.id AND s.is_active = 1
     WHERE l.is_active = 1";

fn availability_from_row(row: &rusqlite::Row<'_>) -> Result<LotAvailability, rusqlite::Error> {
    let total: i64 = row.get(5)?;
    let occupied: i64 = row.get(6)?;
    Ok(LotAvailability {
        lot_id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        pincode: row.get(3)?,
        hourly_rate: row.get(4)?,
        total_spots: total,
        occupied_spots: occupied,
        free_spots: total - occupied,
    })
}

/// Create a lot and its initial spots in one transaction.
///
/// Spots are labeled "1" through `spot_count` in creation order. Fails
/// with a conflict if a lot with the same name already exists.
pub async fn create_lot(db: &Database, new_lot: &NewLot) -> Result<Lot, ParkdError> {
    let new_lot = new_lot.clone();
    let result = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let created_at = now_ts();
            let inserted = tx.execute(
                "INSERT INTO lots (name, address, pincode, hourly_rate, declared_spots,
                                   is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
                params![
                    new_lot.name,
                    new_lot.address,
                    new_lot.pincode,
                    new_lot.hourly_rate,
                    new_lot.spot_count,
                    created_at,
                ],
            );
            match inserted {
                Err(e) if crate::database::is_constraint_violation(&e) => {
                    return Ok(Err(ParkdError::Conflict(format!(
                        "lot `{}` already exists",
                        new_lot.name
                    ))));
                }
                Err(e) => return Err(e.into()),
                Ok(_) => {}
            }
            let lot_id = tx.last_insert_rowid();
            for n in 1..=new_lot.spot_count {
                tx.execute(
                    "INSERT INTO spots (lot_id, label, status, is_active, created_at)
                     VALUES (?1, ?2, 'free', 1, ?3)",
                    params![lot_id, n.to_string(), created_at],
                )?;
            }
            tx.commit()?;
            Ok(Ok(Lot {
                id: lot_id,
                name: new_lot.name,
                address: new_lot.address,
                pincode: new_lot.pincode,
                hourly_rate: new_lot.hourly_rate,
                declared_spots: new_lot.spot_count,
                is_active: true,
                created_at,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result
}

/// Get a lot by ID, active or not.
pub async fn get_lot(db: &Database, id: i64) -> Result<Option<Lot>, ParkdError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {LOT_COLUMNS} FROM lots WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], lot_from_row);
            match result {
                Ok(lot) => Ok(Some(lot)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all lots including deactivated ones, for the admin view.
pub async fn list_lots(db: &Database) -> Result<Vec<Lot>, ParkdError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {LOT_COLUMNS} FROM lots ORDER BY id ASC"))?;
            let rows = stmt.query_map([], lot_from_row)?;
            let mut lots = Vec::new();
            for row in rows {
                lots.push(row?);
            }
            Ok(lots)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a lot's descriptive fields and rate. Returns the updated lot.
pub async fn update_lot_info(
    db: &Database,
    id: i64,
    changes: &LotChanges,
) -> Result<Lot, ParkdError> {
    let changes = changes.clone();
    let result = db
        .connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE lots SET
                     name = COALESCE(?1, name),
                     address = COALESCE(?2, address),
                     pincode = COALESCE(?3, pincode),
                     hourly_rate = COALESCE(?4, hourly_rate)
                 WHERE id = ?5",
                params![
                    changes.name,
                    changes.address,
                    changes.pincode,
                    changes.hourly_rate,
                    id
                ],
            );
            match updated {
                Err(e) if crate::database::is_constraint_violation(&e) => {
                    return Ok(Err(ParkdError::Conflict(
                        "another lot already uses that name".to_string(),
                    )));
                }
                Err(e) => return Err(e.into()),
                Ok(0) => return Ok(Err(ParkdError::NotFound(format!("lot {id}")))),
                Ok(_) => {}
            }
            let lot = conn.query_row(
                &format!("SELECT {LOT_COLUMNS} FROM lots WHERE id = ?1"),
                params![id],
                lot_from_row,
            )?;
            Ok(Ok(lot))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result
}

/// Availability of every active lot, ordered by name.
pub async fn availability(db: &Database) -> Result<Vec<LotAvailability>, ParkdError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare(&format!("{AVAILABILITY_SQL} GROUP BY l.id ORDER BY l.name ASC"))?;
            let rows = stmt.query_map([], availability_from_row)?;
            let mut lots = Vec::new();
            for row in rows {
                lots.push(row?);
            }
            Ok(lots)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Availability of active lots whose name, address or pincode matches the
/// search term (case-insensitive substring).
pub async fn search_lots(db: &Database, term: &str) -> Result<Vec<LotAvailability>, ParkdError> {
    let pattern = format!("%{}%", term.trim());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{AVAILABILITY_SQL}
                   AND (l.name LIKE ?1 OR l.address LIKE ?1 OR l.pincode LIKE ?1)
                 GROUP BY l.id ORDER BY l.name ASC"
            ))?;
            let rows = stmt.query_map(params![pattern], availability_from_row)?;
            let mut lots = Vec::new();
            for row in rows {
                lots.push(row?);
            }
            Ok(lots)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// System-wide aggregates for the admin summary endpoint.
pub async fn admin_summary(db: &Database) -> Result<AdminSummary, ParkdError> {
    db.connection()
        .call(|conn| {
            let user_count: i64 =
                conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            let lot_count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM lots WHERE is_active = 1",
                [],
                |row| row.get(0),
            )?;
            let (total_spots, occupied_spots): (i64, i64) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN status = 'occupied' THEN 1 ELSE 0 END), 0)
                 FROM spots WHERE is_active = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let total_revenue: f64 = conn.query_row(
                "SELECT COALESCE(SUM(cost), 0) FROM records WHERE closed_at IS NOT NULL",
                [],
                |row| row.get(0),
            )?;
            Ok(AdminSummary {
                user_count,
                lot_count,
                total_spots,
                occupied_spots,
                total_revenue,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}
