// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue worker: drains `mail_queue` and hands finished messages to the
//! mailer. Failed entries are retried by the queue's attempt accounting.

use std::sync::Arc;
use std::time::Duration;

use parkd_core::{Mailer, OutboundEmail, ParkdError, QueueEntry};
use parkd_storage::Database;
use parkd_storage::queries::queue;
use tokio_util::sync::CancellationToken;

use crate::tasks::{CSV_EXPORT_QUEUE, MAIL_QUEUE, REPORT_QUEUE, UserJob, build_csv_export,
    build_monthly_report};

const QUEUES: &[&str] = &[MAIL_QUEUE, REPORT_QUEUE, CSV_EXPORT_QUEUE];

pub struct QueueWorker {
    db: Database,
    mailer: Arc<dyn Mailer>,
    poll: Duration,
}

impl QueueWorker {
    pub fn new(db: Database, mailer: Arc<dyn Mailer>, poll_secs: u64) -> Self {
        Self {
            db,
            mailer,
            poll: Duration::from_secs(poll_secs),
        }
    }

    /// Run until cancelled, sleeping `poll` between passes over an empty
    /// queue.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!("queue worker started");
        loop {
            let processed = match self.drain_once().await {
                Ok(n) => n,
                Err(e) => {
                    tracing::error!(error = %e, "queue pass failed");
                    0
                }
            };
            if processed > 0 {
                continue;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.poll) => {}
                _ = cancel.cancelled() => {
                    tracing::info!("queue worker shutting down");
                    break;
                }
            }
        }
    }

    /// Take at most one entry from each queue and process it. Returns the
    /// number of entries handled.
    pub async fn drain_once(&self) -> Result<usize, ParkdError> {
        let mut processed = 0;
        for name in QUEUES {
            if let Some(entry) = queue::dequeue(&self.db, name).await? {
                processed += 1;
                match self.process(&entry).await {
                    Ok(()) => queue::ack(&self.db, entry.id).await?,
                    Err(e) => {
                        tracing::warn!(
                            id = entry.id,
                            queue = %entry.queue_name,
                            attempts = entry.attempts + 1,
                            error = %e,
                            "job failed"
                        );
                        queue::fail(&self.db, entry.id).await?;
                    }
                }
            }
        }
        Ok(processed)
    }

    async fn process(&self, entry: &QueueEntry) -> Result<(), ParkdError> {
        match entry.queue_name.as_str() {
            MAIL_QUEUE => {
                let email: OutboundEmail = serde_json::from_str(&entry.payload)
                    .map_err(|e| ParkdError::Internal(format!("bad mail payload: {e}")))?;
                self.mailer.send(&email).await
            }
            REPORT_QUEUE => {
                let job: UserJob = serde_json::from_str(&entry.payload)
                    .map_err(|e| ParkdError::Internal(format!("bad report payload: {e}")))?;
                match build_monthly_report(&self.db, job.user_id).await? {
                    Some(email) => self.mailer.send(&email).await,
                    None => Ok(()),
                }
            }
            CSV_EXPORT_QUEUE => {
                let job: UserJob = serde_json::from_str(&entry.payload)
                    .map_err(|e| ParkdError::Internal(format!("bad export payload: {e}")))?;
                match build_csv_export(&self.db, job.user_id).await? {
                    Some(email) => self.mailer.send(&email).await,
                    None => Ok(()),
                }
            }
            other => Err(ParkdError::Internal(format!("unknown queue {other}"))),
        }
    }
}
