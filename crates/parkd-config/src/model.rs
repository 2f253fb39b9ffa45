// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the parkd reservation service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level parkd configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParkdConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound SMTP settings.
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Background job and scheduler settings.
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on admin routes. `None` disables admin routes
    /// entirely (fail-closed).
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// TTL in seconds for the cached dashboard availability payload.
    #[serde(default = "default_dashboard_cache_ttl")]
    pub dashboard_cache_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_token: None,
            log_level: default_log_level(),
            dashboard_cache_ttl_secs: default_dashboard_cache_ttl(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dashboard_cache_ttl() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parkd").join("parkd.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("parkd.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Outbound SMTP configuration.
///
/// When `enabled` is false the service logs outbound messages instead of
/// delivering them, which is the default for development.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    /// Enable real SMTP delivery.
    #[serde(default)]
    pub enabled: bool,

    /// SMTP relay hostname.
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// SMTP relay port (465 implicit TLS, 587 STARTTLS).
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// SMTP username. `None` sends unauthenticated.
    #[serde(default)]
    pub username: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub password: Option<String>,

    /// From address on all outbound mail.
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: None,
            password: None,
            from_address: default_from_address(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_address() -> String {
    "parkd@localhost".to_string()
}

/// Background job and scheduler configuration.
///
/// Schedules are five-field cron expressions evaluated in UTC.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JobsConfig {
    /// Expiry sweep cadence.
    #[serde(default = "default_sweep_schedule")]
    pub sweep_schedule: String,

    /// Hours a booking may stay open before the sweeper force-closes it.
    #[serde(default = "default_sweep_threshold_hours")]
    pub sweep_threshold_hours: i64,

    /// Daily inactivity reminder schedule.
    #[serde(default = "default_reminder_schedule")]
    pub reminder_schedule: String,

    /// Monthly usage report schedule.
    #[serde(default = "default_report_schedule")]
    pub report_schedule: String,

    /// Old-record cleanup schedule.
    #[serde(default = "default_cleanup_schedule")]
    pub cleanup_schedule: String,

    /// Days a completed record is retained before cleanup deletes it.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Seconds the queue worker sleeps when the queue is empty.
    #[serde(default = "default_worker_poll_secs")]
    pub worker_poll_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            sweep_schedule: default_sweep_schedule(),
            sweep_threshold_hours: default_sweep_threshold_hours(),
            reminder_schedule: default_reminder_schedule(),
            report_schedule: default_report_schedule(),
            cleanup_schedule: default_cleanup_schedule(),
            retention_days: default_retention_days(),
            worker_poll_secs: default_worker_poll_secs(),
        }
    }
}

fn default_sweep_schedule() -> String {
    "*/5 * * * *".to_string()
}

fn default_sweep_threshold_hours() -> i64 {
    24
}

fn default_reminder_schedule() -> String {
    "0 18 * * *".to_string()
}

fn default_report_schedule() -> String {
    "0 8 1 * *".to_string()
}

fn default_cleanup_schedule() -> String {
    "0 3 * * *".to_string()
}

fn default_retention_days() -> i64 {
    365
}

fn default_worker_poll_secs() -> u64 {
    5
}
