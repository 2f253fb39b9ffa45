// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget job submission seam.

use async_trait::async_trait;

use crate::error::ParkdError;

/// Accepts job submissions for eventual, at-least-once execution.
///
/// `enqueue` returns as soon as the job is durably recorded; it never
/// blocks on or reports the outcome of the job itself. Failures to
/// enqueue must not be propagated as failures of the triggering
/// operation — callers log and move on.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submit a job by queue name with a JSON payload. Returns the entry id.
    async fn enqueue(&self, job_name: &str, payload: &str) -> Result<i64, ParkdError>;
}
