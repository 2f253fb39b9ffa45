// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reservation lifecycle for the parkd service.
//!
//! Each operation here is a single SQLite transaction: allocation,
//! release, the expiry sweep, and lot capacity changes either fully
//! happen or leave no trace.

pub mod allocate;
pub mod billing;
pub mod capacity;
pub mod release;
pub mod sweep;

#[cfg(test)]
mod test_support;

pub use allocate::{book, normalize_vehicle};
pub use billing::{MIN_BILLABLE_HOURS, billable_hours, parking_cost, round2};
pub use capacity::{deactivate_lot, resize_lot};
pub use release::release;
pub use sweep::sweep_expired;
