// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use parkd_core::{ParkdError, User, now_ts};
use rusqlite::params;

use crate::database::Database;
use crate::models::NewUser;

fn user_from_row(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        address: row.get(4)?,
        pincode: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const USER_COLUMNS: &str = "id, username, email, full_name, address, pincode, created_at";

/// Register a new user. Fails with a conflict if the username or email
/// is already taken.
pub async fn create_user(db: &Database, new_user: &NewUser) -> Result<User, ParkdError> {
    let new_user = new_user.clone();
    let result = db
        .connection()
        .call(move |conn| {
            let created_at = now_ts();
            let inserted = conn.execute(
                "INSERT INTO users (username, email, full_name, address, pincode, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new_user.username,
                    new_user.email,
                    new_user.full_name,
                    new_user.address,
                    new_user.pincode,
                    created_at,
                ],
            );
            match inserted {
                Err(e) if crate::database::is_constraint_violation(&e) => {
                    return Ok(Err(ParkdError::Conflict(format!(
                        "username or email already registered: {}",
                        new_user.username
                    ))));
                }
                Err(e) => return Err(e.into()),
                Ok(_) => {}
            }
            Ok(Ok(User {
                id: conn.last_insert_rowid(),
                username: new_user.username,
                email: new_user.email,
                full_name: new_user.full_name,
                address: new_user.address,
                pincode: new_user.pincode,
                created_at,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result
}

/// Get a user by ID.
pub async fn get_user(db: &Database, id: i64) -> Result<Option<User>, ParkdError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], user_from_row);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all users, oldest first.
pub async fn list_users(db: &Database) -> Result<Vec<User>, ParkdError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))?;
            let rows = stmt.query_map([], user_from_row)?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List users that have an email address on file. Broadcast and digest
/// jobs iterate over this set.
pub async fn list_users_with_email(db: &Database) -> Result<Vec<User>, ParkdError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email IS NOT NULL ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([], user_from_row)?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a user's profile fields. Returns the updated user.
pub async fn update_profile(
    db: &Database,
    id: i64,
    full_name: Option<String>,
    address: Option<String>,
    pincode: Option<String>,
) -> Result<User, ParkdError> {
    let result = db
        .connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE users SET
                     full_name = COALESCE(?1, full_name),
                     address = COALESCE(?2, address),
                     pincode = COALESCE(?3, pincode)
                 WHERE id = ?4",
                params![full_name, address, pincode, id],
            )?;
            if changed == 0 {
                return Ok(Err(ParkdError::NotFound(format!("user {id}"))));
            }
            let user = conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )?;
            Ok(Ok(user))
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    result
}
