// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled job bodies. Each is a plain async function over the
//! database so the scheduler stays a thin timing shell.
//!
//! Jobs that produce email never deliver directly; they enqueue into
//! `mail_queue` and let the worker retry on transient SMTP failures.

use parkd_core::{ParkdError, format_ts};
use parkd_mailer::bodies;
use parkd_storage::Database;
use parkd_storage::queries::{lots, queue, records, users};
use serde::{Deserialize, Serialize};

use crate::time::{previous_month_window, start_of_day};

/// Queue carrying ready-to-send [`parkd_core::OutboundEmail`] JSON.
pub const MAIL_QUEUE: &str = "mail";
/// Queue carrying [`UserJob`] payloads for on-demand monthly reports.
pub const REPORT_QUEUE: &str = "report";
/// Queue carrying [`UserJob`] payloads for CSV history exports.
pub const CSV_EXPORT_QUEUE: &str = "csv_export";

/// Payload for per-user jobs (reports, exports).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserJob {
    pub user_id: i64,
}

/// Force-close bookings open longer than the configured threshold.
pub async fn run_sweep(db: &Database, threshold_hours: i64) -> Result<usize, ParkdError> {
    parkd_booking::sweep_expired(db, threshold_hours).await
}

/// Delete completed records older than the retention window.
pub async fn run_cleanup(db: &Database, retention_days: i64) -> Result<usize, ParkdError> {
    let cutoff = format_ts(chrono::Utc::now() - chrono::Duration::days(retention_days));
    let deleted = records::delete_closed_before(db, &cutoff).await?;
    if deleted > 0 {
        tracing::info!(deleted, retention_days, "removed expired booking records");
    }
    Ok(deleted)
}

/// Queue an availability reminder for every user with an email address
/// who has not opened a booking today. Returns the number queued.
pub async fn run_inactivity_reminder(db: &Database) -> Result<usize, ParkdError> {
    let today = start_of_day(chrono::Utc::now());
    let active: std::collections::HashSet<i64> = records::user_ids_active_since(db, &today)
        .await?
        .into_iter()
        .collect();
    let availability = lots::availability(db).await?;

    let mut queued = 0;
    for user in users::list_users_with_email(db).await? {
        if active.contains(&user.id) {
            continue;
        }
        if let Some(email) = bodies::inactivity_reminder(&user, &availability) {
            let payload = serde_json::to_string(&email)
                .map_err(|e| ParkdError::Internal(format!("encode reminder email: {e}")))?;
            queue::enqueue(db, MAIL_QUEUE, &payload).await?;
            queued += 1;
        }
    }
    tracing::info!(queued, "queued inactivity reminders");
    Ok(queued)
}

/// Queue a monthly report job for every user with an email address.
/// Returns the number queued.
pub async fn run_monthly_reports(db: &Database) -> Result<usize, ParkdError> {
    let mut queued = 0;
    for user in users::list_users_with_email(db).await? {
        let payload = serde_json::to_string(&UserJob { user_id: user.id })
            .map_err(|e| ParkdError::Internal(format!("encode report job: {e}")))?;
        queue::enqueue(db, REPORT_QUEUE, &payload).await?;
        queued += 1;
    }
    tracing::info!(queued, "queued monthly reports");
    Ok(queued)
}

/// Number of history rows included inline in the monthly report email.
const REPORT_ROW_LIMIT: usize = 15;

/// Build the previous-month report email for one user.
///
/// Returns `None` when the user is unknown or has no email on file.
pub async fn build_monthly_report(
    db: &Database,
    user_id: i64,
) -> Result<Option<parkd_core::OutboundEmail>, ParkdError> {
    let Some(user) = users::get_user(db, user_id).await? else {
        return Ok(None);
    };
    let (from, to, label) = previous_month_window(chrono::Utc::now());
    let summary = records::activity_summary(db, user_id, &from, &to).await?;
    let mut rows = records::history_between(db, user_id, &from, &to).await?;
    rows.truncate(REPORT_ROW_LIMIT);

    let report = bodies::MonthlyReport {
        month_label: label,
        total_bookings: summary.total_bookings,
        total_spent: summary.total_spent,
        total_hours: summary.total_hours,
        most_used_lot: summary.most_used_lot,
        rows,
    };
    Ok(bodies::monthly_report(&user, &report))
}

/// Build the full-history CSV export email for one user.
///
/// Returns `None` when the user is unknown or has no email on file.
pub async fn build_csv_export(
    db: &Database,
    user_id: i64,
) -> Result<Option<parkd_core::OutboundEmail>, ParkdError> {
    let Some(user) = users::get_user(db, user_id).await? else {
        return Ok(None);
    };
    let history = records::history_for_user(db, user_id, None).await?;
    let csv = parkd_mailer::build_history_csv(&history)?;
    Ok(bodies::csv_export(&user, csv))
}

/// Queue a new-lot announcement for every user with an email address.
/// Called after an admin creates a lot. Returns the number queued.
pub async fn broadcast_new_lot(db: &Database, lot_id: i64) -> Result<usize, ParkdError> {
    let Some(lot) = lots::get_lot(db, lot_id).await? else {
        return Err(ParkdError::NotFound(format!("lot {lot_id}")));
    };
    let mut queued = 0;
    for user in users::list_users_with_email(db).await? {
        if let Some(email) = bodies::new_lot_announcement(&user, &lot) {
            let payload = serde_json::to_string(&email)
                .map_err(|e| ParkdError::Internal(format!("encode announcement: {e}")))?;
            queue::enqueue(db, MAIL_QUEUE, &payload).await?;
            queued += 1;
        }
    }
    tracing::info!(lot_id, queued, "queued new lot announcements");
    Ok(queued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkd_booking::book;
    use parkd_core::OutboundEmail;
    use parkd_storage::models::{NewLot, NewUser};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_user(db: &Database, username: &str, email: Option<&str>) -> i64 {
        users::create_user(
            db,
            &NewUser {
                username: username.to_string(),
                email: email.map(|s| s.to_string()),
                full_name: None,
                address: None,
                pincode: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn seed_lot(db: &Database, name: &str, spots: i64) -> i64 {
        lots::create_lot(
            db,
            &NewLot {
                name: name.to_string(),
                address: "12 Station Rd".to_string(),
                pincode: "560001".to_string(),
                hourly_rate: 50.0,
                spot_count: spots,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn reminder_skips_users_active_today() {
        let (db, _dir) = setup_db().await;
        let idle = seed_user(&db, "idle", Some("idle@example.com")).await;
        let busy = seed_user(&db, "busy", Some("busy@example.com")).await;
        let _no_mail = seed_user(&db, "nomail", None).await;
        let lot = seed_lot(&db, "Central", 2).await;
        book(&db, busy, lot, "KA01AB1234").await.unwrap();

        let queued = run_inactivity_reminder(&db).await.unwrap();
        assert_eq!(queued, 1);

        let entry = queue::dequeue(&db, MAIL_QUEUE).await.unwrap().unwrap();
        let email: OutboundEmail = serde_json::from_str(&entry.payload).unwrap();
        assert_eq!(email.to, "idle@example.com");
        assert!(queue::dequeue(&db, MAIL_QUEUE).await.unwrap().is_none());

        let _ = idle;
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn monthly_reports_queue_one_job_per_mailable_user() {
        let (db, _dir) = setup_db().await;
        let a = seed_user(&db, "a", Some("a@example.com")).await;
        let b = seed_user(&db, "b", Some("b@example.com")).await;
        seed_user(&db, "c", None).await;

        let queued = run_monthly_reports(&db).await.unwrap();
        assert_eq!(queued, 2);

        let mut ids = Vec::new();
        while let Some(entry) = queue::dequeue(&db, REPORT_QUEUE).await.unwrap() {
            let job: UserJob = serde_json::from_str(&entry.payload).unwrap();
            ids.push(job.user_id);
        }
        ids.sort();
        assert_eq!(ids, vec![a, b]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn monthly_report_for_quiet_month_is_empty_but_sent() {
        let (db, _dir) = setup_db().await;
        let user = seed_user(&db, "asha", Some("asha@example.com")).await;

        let email = build_monthly_report(&db, user).await.unwrap().unwrap();
        assert!(email.text.contains("Bookings: 0"));

        assert!(build_monthly_report(&db, 999).await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn csv_export_includes_history() {
        let (db, _dir) = setup_db().await;
        let user = seed_user(&db, "asha", Some("asha@example.com")).await;
        let lot = seed_lot(&db, "Central", 1).await;
        let record = book(&db, user, lot, "KA01AB1234").await.unwrap();
        parkd_booking::release(&db, user, record.id).await.unwrap();

        let email = build_csv_export(&db, user).await.unwrap().unwrap();
        let attachment = email.attachment.unwrap();
        assert!(attachment.data.contains("KA01AB1234"));
        assert_eq!(attachment.data.lines().count(), 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn new_lot_broadcast_reaches_all_mailable_users() {
        let (db, _dir) = setup_db().await;
        seed_user(&db, "a", Some("a@example.com")).await;
        seed_user(&db, "b", None).await;
        let lot = seed_lot(&db, "Central", 2).await;

        let queued = broadcast_new_lot(&db, lot).await.unwrap();
        assert_eq!(queued, 1);

        let entry = queue::dequeue(&db, MAIL_QUEUE).await.unwrap().unwrap();
        let email: OutboundEmail = serde_json::from_str(&entry.payload).unwrap();
        assert!(email.subject.contains("Central"));

        assert!(matches!(
            broadcast_new_lot(&db, 999).await,
            Err(ParkdError::NotFound(_))
        ));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cleanup_respects_retention() {
        let (db, _dir) = setup_db().await;
        let user = seed_user(&db, "asha", Some("asha@example.com")).await;
        let lot = seed_lot(&db, "Central", 1).await;

        // A record closed two years ago, inserted directly.
        let spot_id = parkd_storage::queries::spots::list_for_lot(&db, lot)
            .await
            .unwrap()[0]
            .id;
        db.connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO records (user_id, spot_id, vehicle, opened_at, closed_at, cost)
                     VALUES (?1, ?2, 'KA01AB1234',
                             '2024-01-01T10:00:00.000Z', '2024-01-01T12:00:00.000Z', 100.0)",
                    rusqlite::params![user, spot_id],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(run_cleanup(&db, 365).await.unwrap(), 1);
        assert_eq!(run_cleanup(&db, 365).await.unwrap(), 0);

        db.close().await.unwrap();
    }
}
