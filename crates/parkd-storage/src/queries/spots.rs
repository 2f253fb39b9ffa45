// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spot lookup queries. Status transitions happen inside the booking
//! transactions, not here.

use std::str::FromStr;

use parkd_core::{ParkdError, Spot, SpotStatus};
use rusqlite::params;

use crate::database::Database;
use crate::models::SpotDetail;

pub(crate) fn spot_from_row(row: &rusqlite::Row<'_>) -> Result<Spot, rusqlite::Error> {
    let status: String = row.get(3)?;
    let status = SpotStatus::from_str(&status).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("bad spot status: {status}").into(),
        )
    })?;
    Ok(Spot {
        id: row.get(0)?,
        lot_id: row.get(1)?,
        label: row.get(2)?,
        status,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const SPOT_COLUMNS: &str = "id, lot_id, label, status, is_active, created_at";

/// Get a spot by ID.
pub async fn get_spot(db: &Database, id: i64) -> Result<Option<Spot>, ParkdError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {SPOT_COLUMNS} FROM spots WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], spot_from_row);
            match result {
                Ok(spot) => Ok(Some(spot)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List the active spots of a lot in creation order.
pub async fn list_for_lot(db: &Database, lot_id: i64) -> Result<Vec<Spot>, ParkdError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SPOT_COLUMNS} FROM spots
                 WHERE lot_id = ?1 AND is_active = 1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![lot_id], spot_from_row)?;
            let mut spots = Vec::new();
            for row in rows {
                spots.push(row?);
            }
            Ok(spots)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a lot's active spots joined with the open booking on each, for the
/// admin inspection view.
pub async fn list_details_for_lot(
    db: &Database,
    lot_id: i64,
) -> Result<Vec<SpotDetail>, ParkdError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT s.id, s.lot_id, s.label, s.status, s.is_active, s.created_at,
                        r.vehicle, u.username, r.opened_at
                 FROM spots s
                 LEFT JOIN records r ON r.spot_id = s.id AND r.closed_at IS NULL
                 LEFT JOIN users u ON u.id = r.user_id
                 WHERE s.lot_id = ?1 AND s.is_active = 1
                 ORDER BY s.id ASC",
            )?;
            let rows = stmt.query_map(params![lot_id], |row| {
                Ok(SpotDetail {
                    spot: spot_from_row(row)?,
                    vehicle: row.get(6)?,
                    username: row.get(7)?,
                    opened_at: row.get(8)?,
                })
            })?;
            let mut details = Vec::new();
            for row in rows {
                details.push(row?);
            }
            Ok(details)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
