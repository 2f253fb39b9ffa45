// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound email seam.

use async_trait::async_trait;

use crate::error::ParkdError;
use crate::types::OutboundEmail;

/// Sends a single email and reports success or failure.
///
/// The core never depends on delivery succeeding: callers enqueue messages
/// fire-and-forget and the queue worker is the only place `send` errors
/// are acted on (retry with attempt caps).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), ParkdError>;
}
