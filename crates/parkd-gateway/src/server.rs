// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. Route groups:
//! - public: health, user registration
//! - user: booking lifecycle and reads, identified by `x-user-id`
//! - admin: lot management, behind bearer auth (fail-closed)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};
use parkd_core::{JobQueue, ParkdError};
use parkd_storage::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, admin_auth_middleware};
use crate::cache::TtlCache;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Producer side of the background job queue.
    pub queue: Arc<dyn JobQueue>,
    pub auth: AuthConfig,
    /// Dashboard availability cache.
    pub cache: Arc<TtlCache>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        db: Database,
        queue: Arc<dyn JobQueue>,
        admin_token: Option<String>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            db,
            queue,
            auth: AuthConfig { admin_token },
            cache: Arc::new(TtlCache::new(cache_ttl)),
            start_time: Instant::now(),
        }
    }
}

/// Assemble the full route tree over the given state.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/users", post(handlers::user::register))
        .with_state(state.clone());

    let user_routes = Router::new()
        .route("/v1/lots", get(handlers::user::list_lots))
        .route("/v1/dashboard", get(handlers::user::dashboard))
        .route("/v1/profile", patch(handlers::user::update_profile))
        .route("/v1/bookings", post(handlers::user::create_booking))
        .route("/v1/bookings", get(handlers::user::booking_history))
        .route(
            "/v1/bookings/{id}/release",
            post(handlers::user::release_booking),
        )
        .route("/v1/stats", get(handlers::user::stats))
        .route("/v1/exports/csv", post(handlers::user::export_csv))
        .route("/v1/reports/monthly", post(handlers::user::request_report))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/v1/admin/lots", post(handlers::admin::create_lot))
        .route("/v1/admin/lots", get(handlers::admin::list_lots))
        .route("/v1/admin/lots/{id}", patch(handlers::admin::update_lot))
        .route(
            "/v1/admin/lots/{id}/capacity",
            put(handlers::admin::resize_lot),
        )
        .route("/v1/admin/lots/{id}", delete(handlers::admin::deactivate_lot))
        .route("/v1/admin/lots/{id}/spots", get(handlers::admin::lot_spots))
        .route("/v1/admin/summary", get(handlers::admin::summary))
        .route("/v1/admin/users", get(handlers::admin::list_users))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            admin_auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the server future is dropped or errors.
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<(), ParkdError> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ParkdError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ParkdError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use parkd_storage::SqliteQueue;
    use tempfile::tempdir;
    use tower::ServiceExt;

    async fn test_state(admin_token: Option<&str>) -> (AppState, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let queue = Arc::new(SqliteQueue::new(db.clone()));
        let state = AppState::new(
            db,
            queue,
            admin_token.map(|s| s.to_string()),
            Duration::from_secs(30),
        );
        (state, dir)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (state, _dir) = test_state(None).await;
        let app = build_router(state);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_fail_closed_without_token() {
        let (state, _dir) = test_state(None).await;
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::get("/v1/admin/summary")
                    .header("authorization", "Bearer anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_routes_reject_wrong_token() {
        let (state, _dir) = test_state(Some("secret")).await;
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(Request::get("/v1/admin/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::get("/v1/admin/summary")
                    .header("authorization", "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_routes_accept_correct_token() {
        let (state, _dir) = test_state(Some("secret")).await;
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::get("/v1/admin/summary")
                    .header("authorization", "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn user_routes_require_user_header() {
        let (state, _dir) = test_state(None).await;
        let app = build_router(state);

        let response = app
            .oneshot(Request::get("/v1/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
