// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parkd serve` command implementation.
//!
//! Opens SQLite storage, wires the mail transport and job queue, spawns the
//! cron scheduler and queue worker, and runs the HTTP gateway until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use parkd_config::ParkdConfig;
use parkd_core::{JobQueue, ParkdError};
use parkd_gateway::{AppState, start_server};
use parkd_jobs::{QueueWorker, Scheduler};
use parkd_storage::{Database, SqliteQueue};
use tracing::info;

use crate::shutdown;

/// Runs the `parkd serve` command.
///
/// All background tasks share one [`CancellationToken`]; cancelling it
/// (via SIGINT/SIGTERM) drains them before the database is closed.
///
/// [`CancellationToken`]: tokio_util::sync::CancellationToken
pub async fn run_serve(config: ParkdConfig) -> Result<(), ParkdError> {
    init_tracing(&config.server.log_level);

    info!("starting parkd serve");

    let db =
        Database::open_with_options(&config.storage.database_path, config.storage.wal_mode).await?;
    info!(path = config.storage.database_path.as_str(), "storage ready");

    let mailer = parkd_mailer::mailer_from_config(&config.smtp)?;
    let queue: Arc<dyn JobQueue> = Arc::new(SqliteQueue::new(db.clone()));

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    // Cron scheduler: expiry sweep, inactivity reminders, monthly reports,
    // old-record cleanup. Fails fast on an unparsable schedule.
    let scheduler = Scheduler::new(db.clone(), config.jobs.clone());
    let scheduler_handles = scheduler.spawn(cancel.clone())?;
    info!(jobs = scheduler_handles.len(), "scheduler started");

    // Queue worker: delivers queued mail and builds report/export payloads.
    let worker = QueueWorker::new(db.clone(), mailer, config.jobs.worker_poll_secs);
    let worker_handle = {
        let worker_cancel = cancel.clone();
        tokio::spawn(async move {
            worker.run(worker_cancel).await;
        })
    };

    let state = AppState::new(
        db.clone(),
        queue,
        config.server.admin_token.clone(),
        Duration::from_secs(config.server.dashboard_cache_ttl_secs),
    );
    if config.server.admin_token.is_none() {
        info!("no admin token configured, admin routes will reject all requests");
    }

    let server_result = tokio::select! {
        result = start_server(&config.server.host, config.server.port, state) => result,
        _ = cancel.cancelled() => {
            info!("shutdown signal received, stopping gateway");
            Ok(())
        }
    };

    // Stop background tasks even when the server exited on its own.
    cancel.cancel();
    if worker_handle.await.is_err() {
        tracing::warn!("queue worker task panicked during shutdown");
    }
    for handle in scheduler_handles {
        if handle.await.is_err() {
            tracing::warn!("scheduler task panicked during shutdown");
        }
    }

    db.close().await?;
    info!("parkd serve shutdown complete");
    server_result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parkd={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
