// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input and row shapes private to the storage layer's callers.

use parkd_core::Spot;
use serde::{Deserialize, Serialize};

/// Fields required to register a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

/// Fields required to create a lot together with its initial spots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLot {
    pub name: String,
    pub address: String,
    pub pincode: String,
    pub hourly_rate: f64,
    pub spot_count: i64,
}

/// Mutable lot fields for the admin edit operation. Spot count changes go
/// through the resize operation instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
}

/// A spot joined with its open booking, if any. Used by the admin
/// spot inspection view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotDetail {
    pub spot: Spot,
    pub vehicle: Option<String>,
    pub username: Option<String>,
    pub opened_at: Option<String>,
}

/// Aggregates over one user's completed bookings in a reporting window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub total_bookings: i64,
    pub total_spent: f64,
    pub total_hours: f64,
    pub most_used_lot: Option<String>,
}
