// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handlers for registration and the booking lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use parkd_core::{BookingRecord, HistoryRow, LotAvailability, ParkdError, User, UserStats};
use parkd_jobs::{CSV_EXPORT_QUEUE, REPORT_QUEUE, UserJob};
use parkd_storage::models::NewUser;
use parkd_storage::queries::{lots, records, users};
use serde::{Deserialize, Serialize};

use crate::auth::user_id_from_headers;
use crate::error::ApiError;
use crate::server::AppState;

const AVAILABILITY_CACHE_KEY: &str = "availability";

/// Request body for POST /v1/users.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

/// POST /v1/users
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let username = body.username.trim().to_string();
    if username.len() < 3 {
        return Err(ApiError(ParkdError::Validation(
            "username must be at least 3 characters".to_string(),
        )));
    }
    if let Some(email) = &body.email {
        if !email.contains('@') {
            return Err(ApiError(ParkdError::Validation(format!(
                "`{email}` is not a valid email address"
            ))));
        }
    }
    let user = users::create_user(
        &state.db,
        &NewUser {
            username,
            email: body.email,
            full_name: body.full_name,
            address: body.address,
            pincode: body.pincode,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Request body for PATCH /v1/profile. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

/// PATCH /v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ProfileUpdateRequest>,
) -> Result<Json<User>, ApiError> {
    let user_id = user_id_from_headers(&headers)?;
    let user = users::update_profile(
        &state.db,
        user_id,
        body.full_name,
        body.address,
        body.pincode,
    )
    .await?;
    Ok(Json(user))
}

/// Query string for GET /v1/lots.
#[derive(Debug, Deserialize)]
pub struct LotsQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /v1/lots
///
/// Availability of every active lot, optionally filtered by a search
/// term over name, address and pincode.
pub async fn list_lots(
    State(state): State<AppState>,
    Query(query): Query<LotsQuery>,
) -> Result<Json<Vec<LotAvailability>>, ApiError> {
    let result = match query.q.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => lots::search_lots(&state.db, term).await?,
        _ => lots::availability(&state.db).await?,
    };
    Ok(Json(result))
}

/// Response body for GET /v1/dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub lots: serde_json::Value,
    pub active_booking: Option<BookingRecord>,
}

/// GET /v1/dashboard
///
/// Availability is shared across users and served cache-aside; the
/// caller's open booking is always read fresh.
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardResponse>, ApiError> {
    let user_id = user_id_from_headers(&headers)?;

    let lots_payload = match state.cache.get(AVAILABILITY_CACHE_KEY) {
        Some(cached) => cached,
        None => {
            let availability = lots::availability(&state.db).await?;
            let value = serde_json::to_value(&availability)
                .map_err(|e| ParkdError::Internal(format!("encode availability: {e}")))?;
            state.cache.put(AVAILABILITY_CACHE_KEY, value.clone());
            value
        }
    };

    let active_booking = records::open_record_for_user(&state.db, user_id).await?;
    Ok(Json(DashboardResponse {
        lots: lots_payload,
        active_booking,
    }))
}

/// Request body for POST /v1/bookings.
#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub lot_id: i64,
    pub vehicle: String,
}

/// POST /v1/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingRecord>), ApiError> {
    let user_id = user_id_from_headers(&headers)?;
    let record = parkd_booking::book(&state.db, user_id, body.lot_id, &body.vehicle).await?;
    state.cache.clear();
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /v1/bookings/{id}/release
pub async fn release_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<i64>,
) -> Result<Json<BookingRecord>, ApiError> {
    let user_id = user_id_from_headers(&headers)?;
    let record = parkd_booking::release(&state.db, user_id, record_id).await?;
    state.cache.clear();
    Ok(Json(record))
}

/// Query string for GET /v1/bookings.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// GET /v1/bookings
pub async fn booking_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRow>>, ApiError> {
    let user_id = user_id_from_headers(&headers)?;
    let history = records::history_for_user(&state.db, user_id, query.limit).await?;
    Ok(Json(history))
}

/// GET /v1/stats
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserStats>, ApiError> {
    let user_id = user_id_from_headers(&headers)?;
    Ok(Json(records::user_stats(&state.db, user_id).await?))
}

/// Response body for the async job-queueing endpoints.
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
    pub job_id: i64,
}

async fn queue_user_job(
    state: &AppState,
    headers: &HeaderMap,
    queue_name: &str,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    let user_id = user_id_from_headers(headers)?;
    if users::get_user(&state.db, user_id).await?.is_none() {
        return Err(ApiError(ParkdError::NotFound(format!("user {user_id}"))));
    }
    let payload = serde_json::to_string(&UserJob { user_id })
        .map_err(|e| ParkdError::Internal(format!("encode job payload: {e}")))?;
    let job_id = state.queue.enqueue(queue_name, &payload).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(QueuedResponse {
            queued: true,
            job_id,
        }),
    ))
}

/// POST /v1/exports/csv
///
/// Queues a full-history CSV export; the result arrives by email.
pub async fn export_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    queue_user_job(&state, &headers, CSV_EXPORT_QUEUE).await
}

/// POST /v1/reports/monthly
///
/// Queues an on-demand copy of the previous month's report.
pub async fn request_report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    queue_user_job(&state, &headers, REPORT_QUEUE).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::AppState;
    use parkd_storage::models::NewLot;
    use parkd_storage::{Database, SqliteQueue};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    async fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let queue = Arc::new(SqliteQueue::new(db.clone()));
        (
            AppState::new(db, queue, None, Duration::from_secs(30)),
            dir,
        )
    }

    fn user_headers(id: i64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", id.to_string().parse().unwrap());
        headers
    }

    async fn seed_lot(state: &AppState, name: &str, spots: i64) -> i64 {
        lots::create_lot(
            &state.db,
            &NewLot {
                name: name.to_string(),
                address: "12 Station Rd".to_string(),
                pincode: "560001".to_string(),
                hourly_rate: 50.0,
                spot_count: spots,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn seed_user(state: &AppState, username: &str) -> i64 {
        let (status, Json(user)) = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: username.to_string(),
                email: Some(format!("{username}@example.com")),
                full_name: None,
                address: None,
                pincode: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        user.id
    }

    #[tokio::test]
    async fn register_validates_username_and_email() {
        let (state, _dir) = test_state().await;

        let err = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: " ab ".to_string(),
                email: None,
                full_name: None,
                address: None,
                pincode: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err.0, ParkdError::Validation(_)));

        let err = register(
            State(state),
            Json(RegisterRequest {
                username: "asha".to_string(),
                email: Some("nope".to_string()),
                full_name: None,
                address: None,
                pincode: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err.0, ParkdError::Validation(_)));
    }

    #[tokio::test]
    async fn profile_update_keeps_omitted_fields() {
        let (state, _dir) = test_state().await;
        let user_id = seed_user(&state, "asha").await;

        let Json(updated) = update_profile(
            State(state.clone()),
            user_headers(user_id),
            Json(ProfileUpdateRequest {
                full_name: Some("Asha Rao".to_string()),
                address: None,
                pincode: Some("560001".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Asha Rao"));
        assert_eq!(updated.pincode.as_deref(), Some("560001"));
        assert_eq!(updated.email.as_deref(), Some("asha@example.com"));

        let err = update_profile(
            State(state),
            user_headers(999),
            Json(ProfileUpdateRequest {
                full_name: None,
                address: None,
                pincode: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err.0, ParkdError::NotFound(_)));
    }

    #[tokio::test]
    async fn booking_flow_through_handlers() {
        let (state, _dir) = test_state().await;
        let user_id = seed_user(&state, "asha").await;
        let lot_id = seed_lot(&state, "Central", 2).await;

        let (status, Json(record)) = create_booking(
            State(state.clone()),
            user_headers(user_id),
            Json(BookingRequest {
                lot_id,
                vehicle: "ka01ab1234".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record.vehicle, "KA01AB1234");

        let Json(dashboard) = dashboard(State(state.clone()), user_headers(user_id))
            .await
            .unwrap();
        assert_eq!(dashboard.active_booking.as_ref().unwrap().id, record.id);

        let Json(closed) = release_booking(
            State(state.clone()),
            user_headers(user_id),
            Path(record.id),
        )
        .await
        .unwrap();
        assert!(closed.closed_at.is_some());

        let Json(history) = booking_history(
            State(state.clone()),
            user_headers(user_id),
            Query(HistoryQuery { limit: None }),
        )
        .await
        .unwrap();
        assert_eq!(history.len(), 1);

        let Json(stats) = stats(State(state), user_headers(user_id)).await.unwrap();
        assert_eq!(stats.completed_bookings, 1);
    }

    #[tokio::test]
    async fn dashboard_caches_availability_until_cleared() {
        let (state, _dir) = test_state().await;
        let user_id = seed_user(&state, "asha").await;
        seed_lot(&state, "Central", 2).await;

        let Json(first) = dashboard(State(state.clone()), user_headers(user_id))
            .await
            .unwrap();
        assert_eq!(first.lots.as_array().unwrap().len(), 1);

        // A new lot without invalidation is hidden by the cache...
        seed_lot(&state, "East", 2).await;
        let Json(second) = dashboard(State(state.clone()), user_headers(user_id))
            .await
            .unwrap();
        assert_eq!(second.lots.as_array().unwrap().len(), 1);

        // ...and visible after a write clears it.
        state.cache.clear();
        let Json(third) = dashboard(State(state), user_headers(user_id)).await.unwrap();
        assert_eq!(third.lots.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn lot_search_filters() {
        let (state, _dir) = test_state().await;
        seed_lot(&state, "Central", 2).await;
        seed_lot(&state, "East End", 3).await;

        let Json(all) = list_lots(State(state.clone()), Query(LotsQuery { q: None }))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let Json(found) = list_lots(
            State(state),
            Query(LotsQuery {
                q: Some("east".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "East End");
    }

    #[tokio::test]
    async fn export_enqueues_job_for_known_user() {
        let (state, _dir) = test_state().await;
        let user_id = seed_user(&state, "asha").await;

        let (status, Json(response)) = export_csv(State(state.clone()), user_headers(user_id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(response.queued);
        assert!(response.job_id > 0);

        let err = export_csv(State(state), user_headers(999)).await.unwrap_err();
        assert!(matches!(err.0, ParkdError::NotFound(_)));
    }
}
