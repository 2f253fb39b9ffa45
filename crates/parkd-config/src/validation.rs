// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and coherent SMTP settings.

use crate::diagnostic::ConfigError;
use crate::model::ParkdConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParkdConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.log_level `{}` is not one of: {}",
                config.server.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.smtp.enabled {
        if config.smtp.host.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "smtp.host must not be empty when smtp.enabled = true".to_string(),
            });
        }
        if !config.smtp.from_address.contains('@') {
            errors.push(ConfigError::Validation {
                message: format!(
                    "smtp.from_address `{}` is not a valid address",
                    config.smtp.from_address
                ),
            });
        }
    }

    if config.jobs.sweep_threshold_hours < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "jobs.sweep_threshold_hours must be at least 1, got {}",
                config.jobs.sweep_threshold_hours
            ),
        });
    }

    if config.jobs.retention_days < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "jobs.retention_days must be at least 1, got {}",
                config.jobs.retention_days
            ),
        });
    }

    if config.jobs.worker_poll_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "jobs.worker_poll_secs must be non-zero".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
