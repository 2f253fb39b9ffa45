// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron-driven scheduler for the recurring maintenance jobs.
//!
//! One task per schedule. Schedules are five-field cron expressions
//! evaluated in UTC; a failing job run is logged and retried at the next
//! occurrence.

use croner::Cron;
use parkd_config::model::JobsConfig;
use parkd_core::ParkdError;
use parkd_storage::Database;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::tasks;

#[derive(Debug, Clone, Copy)]
enum ScheduledJob {
    Sweep,
    Reminder,
    Reports,
    Cleanup,
}

impl ScheduledJob {
    fn name(self) -> &'static str {
        match self {
            ScheduledJob::Sweep => "sweep",
            ScheduledJob::Reminder => "reminder",
            ScheduledJob::Reports => "reports",
            ScheduledJob::Cleanup => "cleanup",
        }
    }
}

pub struct Scheduler {
    db: Database,
    config: JobsConfig,
}

impl Scheduler {
    pub fn new(db: Database, config: JobsConfig) -> Self {
        Self { db, config }
    }

    /// Parse all schedules and spawn one timer loop per job. Returns the
    /// join handles so the caller can await them on shutdown.
    pub fn spawn(&self, cancel: CancellationToken) -> Result<Vec<JoinHandle<()>>, ParkdError> {
        let jobs = [
            (ScheduledJob::Sweep, self.config.sweep_schedule.as_str()),
            (ScheduledJob::Reminder, self.config.reminder_schedule.as_str()),
            (ScheduledJob::Reports, self.config.report_schedule.as_str()),
            (ScheduledJob::Cleanup, self.config.cleanup_schedule.as_str()),
        ];

        let mut handles = Vec::with_capacity(jobs.len());
        for (job, schedule) in jobs {
            let cron = parse_schedule(job.name(), schedule)?;
            let db = self.db.clone();
            let config = self.config.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(cron_loop(job, cron, db, config, cancel)));
        }
        Ok(handles)
    }
}

/// Parse a five-field cron expression, surfacing a config error with the
/// job name on failure.
pub fn parse_schedule(name: &str, schedule: &str) -> Result<Cron, ParkdError> {
    use std::str::FromStr;

    Cron::from_str(schedule)
        .map_err(|e| ParkdError::Config(format!("bad {name} schedule `{schedule}`: {e}")))
}

async fn cron_loop(
    job: ScheduledJob,
    cron: Cron,
    db: Database,
    config: JobsConfig,
    cancel: CancellationToken,
) {
    tracing::info!(job = job.name(), "scheduler task started");
    loop {
        let next = match cron.find_next_occurrence(&chrono::Utc::now(), false) {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(job = job.name(), error = %e, "no next occurrence, stopping");
                break;
            }
        };
        let wait = (next - chrono::Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                if let Err(e) = run_once(job, &db, &config).await {
                    tracing::error!(job = job.name(), error = %e, "scheduled job failed");
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!(job = job.name(), "scheduler task shutting down");
                break;
            }
        }
    }
}

async fn run_once(job: ScheduledJob, db: &Database, config: &JobsConfig) -> Result<(), ParkdError> {
    match job {
        ScheduledJob::Sweep => {
            tasks::run_sweep(db, config.sweep_threshold_hours).await?;
        }
        ScheduledJob::Reminder => {
            tasks::run_inactivity_reminder(db).await?;
        }
        ScheduledJob::Reports => {
            tasks::run_monthly_reports(db).await?;
        }
        ScheduledJob::Cleanup => {
            tasks::run_cleanup(db, config.retention_days).await?;
        }
    }
    Ok(())
}
