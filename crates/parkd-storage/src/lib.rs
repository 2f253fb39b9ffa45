// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the parkd reservation service.
//!
//! A single async connection serializes all writes; queries are free
//! functions over [`Database`] grouped by table. Transactional booking
//! operations that touch several tables at once live in `parkd-booking`.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::{Database, map_tr_err};
pub use models::{ActivitySummary, LotChanges, NewLot, NewUser, SpotDetail};
pub use queries::queue::SqliteQueue;
