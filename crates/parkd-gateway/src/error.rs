// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from domain errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parkd_core::ParkdError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper giving [`ParkdError`] an HTTP representation.
#[derive(Debug)]
pub struct ApiError(pub ParkdError);

impl From<ParkdError> for ApiError {
    fn from(err: ParkdError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ParkdError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ParkdError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ParkdError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ParkdError::Capacity(msg) => (StatusCode::CONFLICT, msg.clone()),
            // Internal details stay in the logs, not the response.
            _ => {
                tracing::error!(error = %self.0, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ParkdError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(
            status_of(ParkdError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ParkdError::NotFound("lot 7".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ParkdError::Conflict("taken".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ParkdError::Capacity("full".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ParkdError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_body_is_generic() {
        let response = ApiError(ParkdError::Internal("secret detail".into())).into_response();
        // The detail must not leak into the body; only a generic message.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
