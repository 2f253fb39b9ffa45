// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for the parkd reservation service, built on axum.

pub mod auth;
pub mod cache;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use cache::TtlCache;
pub use server::{AppState, build_router, start_server};
