// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the parkd reservation service.

use thiserror::Error;

/// The primary error type used across all parkd crates.
///
/// The first four variants are the domain rejections surfaced to API
/// clients with a machine-readable reason; the remainder are internal
/// failures that are logged and reported generically.
#[derive(Debug, Error)]
pub enum ParkdError {
    /// Malformed input (vehicle identifier too short, missing required fields).
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or inactive lot, spot, user, or booking.
    #[error("not found: {0}")]
    NotFound(String),

    /// State conflict (open booking already exists, occupied spots block a
    /// capacity edit or deactivation).
    #[error("conflict: {0}")]
    Conflict(String),

    /// No free spot in the requested lot.
    #[error("capacity: {0}")]
    Capacity(String),

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound mail errors (SMTP connection, message build failure).
    #[error("mail error: {message}")]
    Mail {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
