// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV serialization of booking history.

use parkd_core::{HistoryRow, ParkdError};

fn csv_err(e: impl std::error::Error + Send + Sync + 'static) -> ParkdError {
    ParkdError::Internal(format!("csv serialization failed: {e}"))
}

/// Render history rows as CSV, newest first, with a header row.
pub fn build_history_csv(rows: &[HistoryRow]) -> Result<String, ParkdError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "record_id",
            "lot",
            "address",
            "pincode",
            "spot_id",
            "vehicle",
            "opened_at",
            "closed_at",
            "duration_hours",
            "cost",
        ])
        .map_err(csv_err)?;
    for row in rows {
        let duration = row
            .duration_hours()
            .map(|h| format!("{h:.2}"))
            .unwrap_or_default();
        writer
            .write_record([
                row.record_id.to_string(),
                row.lot_name.clone(),
                row.lot_address.clone(),
                row.lot_pincode.clone(),
                row.spot_id.to_string(),
                row.vehicle.clone(),
                row.opened_at.clone(),
                row.closed_at.clone().unwrap_or_default(),
                duration,
                format!("{:.2}", row.cost),
            ])
            .map_err(csv_err)?;
    }
    let bytes = writer.into_inner().map_err(|e| csv_err(e.into_error()))?;
    String::from_utf8(bytes).map_err(csv_err)
}
