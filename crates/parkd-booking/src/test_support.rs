// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the booking tests.

use parkd_core::{Lot, User, format_ts};
use parkd_storage::models::{NewLot, NewUser};
use parkd_storage::queries::{lots, users};
use parkd_storage::Database;
use rusqlite::params;
use tempfile::tempdir;

pub async fn setup_db() -> (Database, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    (db, dir)
}

pub async fn seed_user(db: &Database, username: &str) -> User {
    users::create_user(
        db,
        &NewUser {
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            full_name: None,
            address: None,
            pincode: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_lot(db: &Database, name: &str, spot_count: i64) -> Lot {
    lots::create_lot(
        db,
        &NewLot {
            name: name.to_string(),
            address: "12 Station Rd".to_string(),
            pincode: "560001".to_string(),
            hourly_rate: 50.0,
            spot_count,
        },
    )
    .await
    .unwrap()
}

/// Mark every active spot in the lot occupied, bypassing booking rules.
pub async fn occupy_all_spots(db: &Database, lot_id: i64) {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE spots SET status = 'occupied' WHERE lot_id = ?1 AND is_active = 1",
                params![lot_id],
            )?;
            Ok(())
        })
        .await
        .unwrap();
}

/// Rewrite a record's opened_at to `hours_ago` hours in the past.
pub async fn backdate_record(db: &Database, record_id: i64, hours_ago: i64) {
    let opened_at = format_ts(chrono::Utc::now() - chrono::Duration::hours(hours_ago));
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE records SET opened_at = ?1 WHERE id = ?2",
                params![opened_at, record_id],
            )?;
            Ok(())
        })
        .await
        .unwrap();
}
