// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking release: close the record, bill the stay, free the spot.

use parkd_core::{BookingRecord, ParkdError, now_ts};
use parkd_storage::Database;
use rusqlite::params;

use crate::billing::parking_cost;

/// Release booking `record_id` on behalf of `user_id`.
///
/// Bills the stay at the lot's current hourly rate and frees the spot in
/// the same transaction. Only the booking's owner may release it; a
/// record belonging to someone else reads as not found.
pub async fn release(
    db: &Database,
    user_id: i64,
    record_id: i64,
) -> Result<BookingRecord, ParkdError> {
    let result = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let row = {
                let result = tx.query_row(
                    "SELECT r.user_id, r.spot_id, r.vehicle, r.opened_at, r.closed_at,
                            l.hourly_rate
                     FROM records r
                     JOIN spots s ON s.id = r.spot_id
                     JOIN lots l ON l.id = s.lot_id
                     WHERE r.id = ?1",
                    params![record_id],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, Option<String>>(4)?,
                            row.get::<_, f64>(5)?,
                        ))
                    },
                );
                match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Ok(Err(ParkdError::NotFound(format!("booking {record_id}"))));
                    }
                    Err(e) => return Err(e.into()),
                }
            };
            let (owner_id, spot_id, vehicle, opened_at, closed_at, hourly_rate) = row;

            if owner_id != user_id {
                return Ok(Err(ParkdError::NotFound(format!("booking {record_id}"))));
            }
            // An already-closed record is no longer an open booking of
            // the caller's, so it reads the same as a missing one.
            if closed_at.is_some() {
                return Ok(Err(ParkdError::NotFound(format!("booking {record_id}"))));
            }

            let closed_at = now_ts();
            let cost = parking_cost(&opened_at, &closed_at, hourly_rate);
            tx.execute(
                "UPDATE records SET closed_at = ?1, cost = ?2 WHERE id = ?3",
                params![closed_at, cost, record_id],
            )?;
            tx.execute(
                "UPDATE spots SET status = 'free' WHERE id = ?1",
                params![spot_id],
            )?;
            tx.commit()?;

            Ok(Ok(BookingRecord {
                id: record_id,
                user_id,
                spot_id,
                vehicle,
                opened_at,
                closed_at: Some(closed_at),
                cost,
            }))
        })
        .await
        .map_err(parkd_storage::map_tr_err)?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocate::book;
    use crate::test_support::{seed_lot, seed_user, setup_db};
    use parkd_core::SpotStatus;
    use parkd_storage::queries::spots;

    #[tokio::test]
    async fn release_bills_and_frees_the_spot() {
        let (db, _dir) = setup_db().await;
        let user = seed_user(&db, "asha").await;
        let lot = seed_lot(&db, "Central", 1).await;

        let record = book(&db, user.id, lot.id, "KA01AB1234").await.unwrap();
        let closed = release(&db, user.id, record.id).await.unwrap();

        assert!(closed.closed_at.is_some());
        // Sub-minute stay bills the 0.1h floor: 0.1 * 50.0.
        assert_eq!(closed.cost, 5.0);

        let spot = spots::get_spot(&db, record.spot_id).await.unwrap().unwrap();
        assert_eq!(spot.status, SpotStatus::Free);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn already_closed_booking_reads_as_not_found() {
        let (db, _dir) = setup_db().await;
        let user = seed_user(&db, "asha").await;
        let lot = seed_lot(&db, "Central", 1).await;

        let record = book(&db, user.id, lot.id, "KA01AB1234").await.unwrap();
        release(&db, user.id, record.id).await.unwrap();
        let err = release(&db, user.id, record.id).await.unwrap_err();
        assert!(matches!(err, ParkdError::NotFound(_)), "got {err:?}");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn other_users_booking_reads_as_not_found() {
        let (db, _dir) = setup_db().await;
        let owner = seed_user(&db, "asha").await;
        let other = seed_user(&db, "ravi").await;
        let lot = seed_lot(&db, "Central", 1).await;

        let record = book(&db, owner.id, lot.id, "KA01AB1234").await.unwrap();
        let err = release(&db, other.id, record.id).await.unwrap_err();
        assert!(matches!(err, ParkdError::NotFound(_)), "got {err:?}");

        // Owner can still release.
        release(&db, owner.id, record.id).await.unwrap();

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn released_spot_is_immediately_rebookable() {
        let (db, _dir) = setup_db().await;
        let user = seed_user(&db, "asha").await;
        let lot = seed_lot(&db, "Central", 1).await;

        let first = book(&db, user.id, lot.id, "KA01AB1234").await.unwrap();
        release(&db, user.id, first.id).await.unwrap();
        let second = book(&db, user.id, lot.id, "KA01AB1234").await.unwrap();
        assert_eq!(second.spot_id, first.spot_id);

        db.close().await.unwrap();
    }
}
