// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message composition for each kind of notification the service sends.
//!
//! Builders return `None` when the user has no email on file.

use parkd_core::{Attachment, HistoryRow, Lot, LotAvailability, OutboundEmail, User};

/// Input for the monthly activity report message.
#[derive(Debug, Clone)]
pub struct MonthlyReport {
    /// Human-readable month, e.g. "March 2026".
    pub month_label: String,
    pub total_bookings: i64,
    pub total_spent: f64,
    pub total_hours: f64,
    pub most_used_lot: Option<String>,
    /// Most recent rows of the month, newest first.
    pub rows: Vec<HistoryRow>,
}

/// Announcement sent to every registered user when a new lot opens.
pub fn new_lot_announcement(user: &User, lot: &Lot) -> Option<OutboundEmail> {
    let to = user.email.clone()?;
    let text = format!(
        "Hi {},\n\n\
         A new parking lot is now open: {} at {}, {}.\n\
         Hourly rate: {:.2}. Spots available: {}.\n\n\
         Book a spot any time from your dashboard.",
        user.display_name(),
        lot.name,
        lot.address,
        lot.pincode,
        lot.hourly_rate,
        lot.declared_spots,
    );
    Some(OutboundEmail {
        to,
        subject: format!("New parking lot open: {}", lot.name),
        text,
        html: None,
        attachment: None,
    })
}

/// Daily reminder for users with no booking today, listing where space
/// is currently available.
pub fn inactivity_reminder(user: &User, lots: &[LotAvailability]) -> Option<OutboundEmail> {
    let to = user.email.clone()?;
    let mut text = format!(
        "Hi {},\n\nYou have not parked with us today. Current availability:\n\n",
        user.display_name()
    );
    if lots.is_empty() {
        text.push_str("  (no lots are open right now)\n");
    }
    for lot in lots {
        text.push_str(&format!(
            "  {} ({}, {}): {} of {} spots free at {:.2}/h\n",
            lot.name, lot.address, lot.pincode, lot.free_spots, lot.total_spots, lot.hourly_rate,
        ));
    }
    text.push_str("\nReserve a spot before the evening rush.");
    Some(OutboundEmail {
        to,
        subject: "Parking availability today".to_string(),
        text,
        html: None,
        attachment: None,
    })
}

/// Monthly activity report with an HTML table of recent bookings.
pub fn monthly_report(user: &User, report: &MonthlyReport) -> Option<OutboundEmail> {
    let to = user.email.clone()?;

    let most_used = report.most_used_lot.as_deref().unwrap_or("-");
    let text = format!(
        "Hi {},\n\n\
         Your parking activity for {}:\n\n\
         Bookings: {}\n\
         Total spent: {:.2}\n\
         Hours parked: {:.1}\n\
         Most used lot: {}\n",
        user.display_name(),
        report.month_label,
        report.total_bookings,
        report.total_spent,
        report.total_hours,
        most_used,
    );

    let mut html = format!(
        "<h2>Parking report for {}</h2>\
         <p>Hi {},</p>\
         <ul>\
         <li>Bookings: {}</li>\
         <li>Total spent: {:.2}</li>\
         <li>Hours parked: {:.1}</li>\
         <li>Most used lot: {}</li>\
         </ul>",
        report.month_label,
        user.display_name(),
        report.total_bookings,
        report.total_spent,
        report.total_hours,
        most_used,
    );
    if !report.rows.is_empty() {
        html.push_str(
            "<table border=\"1\" cellpadding=\"4\">\
             <tr><th>Lot</th><th>Vehicle</th><th>From</th><th>To</th><th>Cost</th></tr>",
        );
        for row in &report.rows {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>",
                row.lot_name,
                row.vehicle,
                row.opened_at,
                row.closed_at.as_deref().unwrap_or("open"),
                row.cost,
            ));
        }
        html.push_str("</table>");
    }

    Some(OutboundEmail {
        to,
        subject: format!("Your parking report for {}", report.month_label),
        text,
        html: Some(html),
        attachment: None,
    })
}

/// Booking history export, delivered as a CSV attachment.
pub fn csv_export(user: &User, csv: String) -> Option<OutboundEmail> {
    let to = user.email.clone()?;
    Some(OutboundEmail {
        to,
        subject: "Your parking history export".to_string(),
        text: format!(
            "Hi {},\n\nYour booking history export is attached.",
            user.display_name()
        ),
        html: None,
        attachment: Some(Attachment {
            filename: "parking_history.csv".to_string(),
            content_type: "text/csv".to_string(),
            data: csv,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkd_core::now_ts;

    fn sample_user(email: Option<&str>) -> User {
        User {
            id: 1,
            username: "asha".to_string(),
            email: email.map(|s| s.to_string()),
            full_name: Some("Asha Rao".to_string()),
            address: None,
            pincode: None,
            created_at: now_ts(),
        }
    }

    fn sample_lot() -> Lot {
        Lot {
            id: 1,
            name: "Central".to_string(),
            address: "12 Station Rd".to_string(),
            pincode: "560001".to_string(),
            hourly_rate: 50.0,
            declared_spots: 10,
            is_active: true,
            created_at: now_ts(),
        }
    }

    #[test]
    fn no_email_means_no_message() {
        assert!(new_lot_announcement(&sample_user(None), &sample_lot()).is_none());
        assert!(inactivity_reminder(&sample_user(None), &[]).is_none());
        assert!(csv_export(&sample_user(None), String::new()).is_none());
    }

    #[test]
    fn announcement_names_the_lot() {
        let email =
            new_lot_announcement(&sample_user(Some("asha@example.com")), &sample_lot()).unwrap();
        assert_eq!(email.to, "asha@example.com");
        assert!(email.subject.contains("Central"));
        assert!(email.text.contains("Asha Rao"));
        assert!(email.text.contains("12 Station Rd"));
    }

    #[test]
    fn reminder_lists_availability() {
        let lots = vec![LotAvailability {
            lot_id: 1,
            name: "Central".to_string(),
            address: "12 Station Rd".to_string(),
            pincode: "560001".to_string(),
            hourly_rate: 50.0,
            total_spots: 10,
            occupied_spots: 3,
            free_spots: 7,
        }];
        let email = inactivity_reminder(&sample_user(Some("asha@example.com")), &lots).unwrap();
        assert!(email.text.contains("7 of 10 spots free"));
    }

    #[test]
    fn report_includes_summary_and_table() {
        let report = MonthlyReport {
            month_label: "March 2026".to_string(),
            total_bookings: 4,
            total_spent: 320.0,
            total_hours: 6.4,
            most_used_lot: Some("Central".to_string()),
            rows: vec![HistoryRow {
                record_id: 1,
                spot_id: 2,
                lot_name: "Central".to_string(),
                lot_address: "12 Station Rd".to_string(),
                lot_pincode: "560001".to_string(),
                vehicle: "KA01AB1234".to_string(),
                opened_at: "2026-03-01T10:00:00.000Z".to_string(),
                closed_at: Some("2026-03-01T11:30:00.000Z".to_string()),
                cost: 75.0,
            }],
        };
        let email = monthly_report(&sample_user(Some("asha@example.com")), &report).unwrap();
        assert!(email.subject.contains("March 2026"));
        assert!(email.text.contains("Bookings: 4"));
        let html = email.html.unwrap();
        assert!(html.contains("<table"));
        assert!(html.contains("KA01AB1234"));
    }

    #[test]
    fn export_carries_csv_attachment() {
        let email = csv_export(
            &sample_user(Some("asha@example.com")),
            "a,b\n1,2\n".to_string(),
        )
        .unwrap();
        let attachment = email.attachment.unwrap();
        assert_eq!(attachment.filename, "parking_history.csv");
        assert_eq!(attachment.content_type, "text/csv");
    }
}
