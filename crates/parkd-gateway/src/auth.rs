// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the gateway.
//!
//! Admin routes require a bearer token. When no token is configured, all
//! admin requests are rejected (fail-closed).
//!
//! User routes identify the caller with an `x-user-id` header; the
//! service sits behind a front door that performs user authentication.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use parkd_core::ParkdError;

use crate::error::ApiError;

/// Authentication configuration for admin routes.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` disables admin routes entirely.
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Middleware validating the admin bearer token.
pub async fn admin_auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(ref expected_token) = auth.admin_token else {
        tracing::error!("no admin token configured, rejecting admin request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if token == expected_token => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Extract the calling user's ID from the `x-user-id` header.
pub fn user_id_from_headers(headers: &HeaderMap) -> Result<i64, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            ApiError(ParkdError::Validation(
                "missing or invalid x-user-id header".to_string(),
            ))
        })
}
