// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types shared across the parkd workspace.
//!
//! Timestamps are RFC 3339 UTC strings with millisecond precision
//! (`2026-01-01T00:00:00.000Z`). The fixed width makes lexicographic
//! comparison in SQL agree with chronological order.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Produce the canonical timestamp string for "now".
pub fn now_ts() -> String {
    format_ts(chrono::Utc::now())
}

/// Format a UTC instant in the canonical timestamp format.
pub fn format_ts(t: chrono::DateTime<chrono::Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a canonical timestamp string back into a UTC instant.
pub fn parse_ts(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&chrono::Utc))
}

/// Occupancy state of a single parking spot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Free,
    Occupied,
}

/// A named parking facility with an hourly billing rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub pincode: String,
    /// Hourly rate in currency units; non-negative.
    pub hourly_rate: f64,
    /// Spot count the lot was declared with; live spot rows are authoritative.
    pub declared_spots: i64,
    pub is_active: bool,
    pub created_at: String,
}

/// A single physical parking space within a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub id: i64,
    pub lot_id: i64,
    /// Human-readable label, unique within the lot ("1", "2", ...).
    pub label: String,
    pub status: SpotStatus,
    pub is_active: bool,
    pub created_at: String,
}

/// One occupancy episode: a user, a spot, and a time interval.
///
/// `closed_at = None` means the booking is currently open; `cost` stays
/// zero until the record is closed by release or by the expiry sweeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: i64,
    pub user_id: i64,
    pub spot_id: i64,
    pub vehicle: String,
    pub opened_at: String,
    pub closed_at: Option<String>,
    pub cost: f64,
}

/// A registered user. Profile fields are declared optional rather than
/// probed for existence at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub pincode: Option<String>,
    pub created_at: String,
}

impl User {
    /// Preferred display name for email greetings: full name, else username.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

/// An entry in the crash-safe outbound job queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
}

/// A file attached to an outbound email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: String,
}

/// An outbound email message. Serialized as JSON into the mail queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

/// Per-lot availability summary for dashboards and reminder digests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotAvailability {
    pub lot_id: i64,
    pub name: String,
    pub address: String,
    pub pincode: String,
    pub hourly_rate: f64,
    pub total_spots: i64,
    pub occupied_spots: i64,
    pub free_spots: i64,
}

/// One row of a user's booking history, joined with lot details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub record_id: i64,
    pub spot_id: i64,
    pub lot_name: String,
    pub lot_address: String,
    pub lot_pincode: String,
    pub vehicle: String,
    pub opened_at: String,
    pub closed_at: Option<String>,
    pub cost: f64,
}

impl HistoryRow {
    /// Duration in hours for a completed row, `None` while still open.
    pub fn duration_hours(&self) -> Option<f64> {
        let opened = parse_ts(&self.opened_at)?;
        let closed = parse_ts(self.closed_at.as_deref()?)?;
        Some((closed - opened).num_seconds() as f64 / 3600.0)
    }
}

/// Aggregate statistics for one user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_bookings: i64,
    pub active_bookings: i64,
    pub completed_bookings: i64,
    pub total_spent: f64,
}

/// System-wide aggregates for the admin summary endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdminSummary {
    pub user_count: i64,
    pub lot_count: i64,
    pub total_spots: i64,
    pub occupied_spots: i64,
    pub total_revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_roundtrips_and_sorts() {
        let early = format_ts(
            chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        );
        let late = format_ts(
            chrono::DateTime::parse_from_rfc3339("2026-06-15T12:30:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        );
        assert_eq!(early, "2026-01-01T00:00:00.000Z");
        assert!(early < late, "lexicographic order must match chronology");
        assert!(parse_ts(&early).is_some());
    }

    #[test]
    fn spot_status_display_roundtrip() {
        use std::str::FromStr;
        assert_eq!(SpotStatus::Free.to_string(), "free");
        assert_eq!(SpotStatus::from_str("occupied").unwrap(), SpotStatus::Occupied);
    }

    #[test]
    fn user_display_name_prefers_full_name() {
        let mut user = User {
            id: 1,
            username: "asha".to_string(),
            email: Some("asha@example.com".to_string()),
            full_name: None,
            address: None,
            pincode: None,
            created_at: now_ts(),
        };
        assert_eq!(user.display_name(), "asha");
        user.full_name = Some("Asha Rao".to_string());
        assert_eq!(user.display_name(), "Asha Rao");
    }

    #[test]
    fn history_row_duration() {
        let row = HistoryRow {
            record_id: 1,
            spot_id: 1,
            lot_name: "Central".to_string(),
            lot_address: "1 Main St".to_string(),
            lot_pincode: "560001".to_string(),
            vehicle: "KA01AB1234".to_string(),
            opened_at: "2026-01-01T10:00:00.000Z".to_string(),
            closed_at: Some("2026-01-01T11:30:00.000Z".to_string()),
            cost: 75.0,
        };
        assert_eq!(row.duration_hours(), Some(1.5));

        let open = HistoryRow {
            closed_at: None,
            ..row
        };
        assert_eq!(open.duration_hours(), None);
    }

    #[test]
    fn outbound_email_json_roundtrip() {
        let email = OutboundEmail {
            to: "user@example.com".to_string(),
            subject: "hi".to_string(),
            text: "body".to_string(),
            html: None,
            attachment: None,
        };
        let json = serde_json::to_string(&email).unwrap();
        let parsed: OutboundEmail = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);
    }
}
