// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the parkd parking reservation service.
//!
//! This crate provides the error type, the domain model types (lots, spots,
//! booking records, users), and the trait seams (`Mailer`, `JobQueue`) used
//! throughout the parkd workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ParkdError;
pub use traits::{JobQueue, Mailer};
pub use types::{
    AdminSummary, Attachment, BookingRecord, HistoryRow, Lot, LotAvailability, OutboundEmail,
    QueueEntry, Spot, SpotStatus, User, UserStats, format_ts, now_ts, parse_ts,
};
