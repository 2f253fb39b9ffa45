// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background machinery for the parkd service: a cron scheduler for the
//! recurring maintenance jobs and a worker that drains the mail queue.

pub mod scheduler;
pub mod tasks;
pub mod time;
pub mod worker;

pub use scheduler::Scheduler;
pub use tasks::{CSV_EXPORT_QUEUE, MAIL_QUEUE, REPORT_QUEUE, UserJob, broadcast_new_lot};
pub use worker::QueueWorker;
