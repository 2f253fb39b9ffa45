// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound email for the parkd service: SMTP delivery, message bodies
//! for each notification kind, and CSV export rendering.

pub mod bodies;
pub mod export;
pub mod transport;

pub use bodies::MonthlyReport;
pub use export::build_history_csv;
pub use transport::{LogMailer, SmtpMailer};

use std::sync::Arc;

use parkd_config::model::SmtpConfig;
use parkd_core::{Mailer, ParkdError};

/// Build the mailer the configuration asks for: SMTP when enabled,
/// otherwise a logging stand-in.
pub fn mailer_from_config(config: &SmtpConfig) -> Result<Arc<dyn Mailer>, ParkdError> {
    if config.enabled {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}
