// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin handlers: lot management and system-wide views.
//!
//! All routes here sit behind the bearer-token middleware.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use parkd_core::{AdminSummary, Lot, ParkdError, User};
use parkd_storage::models::{LotChanges, NewLot, SpotDetail};
use parkd_storage::queries::{lots, spots, users};
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::AppState;

/// Request body for POST /v1/admin/lots.
#[derive(Debug, Deserialize)]
pub struct CreateLotRequest {
    pub name: String,
    pub address: String,
    pub pincode: String,
    pub hourly_rate: f64,
    pub spot_count: i64,
}

/// POST /v1/admin/lots
///
/// Creates the lot with its spots and queues an announcement email to
/// every registered user.
pub async fn create_lot(
    State(state): State<AppState>,
    Json(body): Json<CreateLotRequest>,
) -> Result<(StatusCode, Json<Lot>), ApiError> {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError(ParkdError::Validation(
            "lot name must not be empty".to_string(),
        )));
    }
    if body.hourly_rate < 0.0 {
        return Err(ApiError(ParkdError::Validation(
            "hourly rate must not be negative".to_string(),
        )));
    }
    if body.spot_count < 1 {
        return Err(ApiError(ParkdError::Validation(
            "a lot must have at least one spot".to_string(),
        )));
    }

    let lot = lots::create_lot(
        &state.db,
        &NewLot {
            name,
            address: body.address,
            pincode: body.pincode,
            hourly_rate: body.hourly_rate,
            spot_count: body.spot_count,
        },
    )
    .await?;

    // Announcements are fire-and-forget: the lot is already committed,
    // so a queueing failure must not fail the create.
    if let Err(e) = parkd_jobs::broadcast_new_lot(&state.db, lot.id).await {
        tracing::warn!(lot_id = lot.id, error = %e, "failed to queue lot announcements");
    }
    state.cache.clear();
    Ok((StatusCode::CREATED, Json(lot)))
}

/// GET /v1/admin/lots
pub async fn list_lots(State(state): State<AppState>) -> Result<Json<Vec<Lot>>, ApiError> {
    Ok(Json(lots::list_lots(&state.db).await?))
}

/// PATCH /v1/admin/lots/{id}
pub async fn update_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
    Json(changes): Json<LotChanges>,
) -> Result<Json<Lot>, ApiError> {
    if let Some(rate) = changes.hourly_rate {
        if rate < 0.0 {
            return Err(ApiError(ParkdError::Validation(
                "hourly rate must not be negative".to_string(),
            )));
        }
    }
    let lot = lots::update_lot_info(&state.db, lot_id, &changes).await?;
    state.cache.clear();
    Ok(Json(lot))
}

/// Request body for PUT /v1/admin/lots/{id}/capacity.
#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    pub spot_count: i64,
}

/// PUT /v1/admin/lots/{id}/capacity
pub async fn resize_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
    Json(body): Json<ResizeRequest>,
) -> Result<Json<Lot>, ApiError> {
    let lot = parkd_booking::resize_lot(&state.db, lot_id, body.spot_count).await?;
    state.cache.clear();
    Ok(Json(lot))
}

/// DELETE /v1/admin/lots/{id}
pub async fn deactivate_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
) -> Result<Json<Lot>, ApiError> {
    let lot = parkd_booking::deactivate_lot(&state.db, lot_id).await?;
    state.cache.clear();
    Ok(Json(lot))
}

/// GET /v1/admin/lots/{id}/spots
pub async fn lot_spots(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
) -> Result<Json<Vec<SpotDetail>>, ApiError> {
    if lots::get_lot(&state.db, lot_id).await?.is_none() {
        return Err(ApiError(ParkdError::NotFound(format!("lot {lot_id}"))));
    }
    Ok(Json(spots::list_details_for_lot(&state.db, lot_id).await?))
}

/// GET /v1/admin/summary
pub async fn summary(State(state): State<AppState>) -> Result<Json<AdminSummary>, ApiError> {
    Ok(Json(lots::admin_summary(&state.db).await?))
}

/// GET /v1/admin/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(users::list_users(&state.db).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkd_jobs::MAIL_QUEUE;
    use parkd_storage::models::NewUser;
    use parkd_storage::queries::queue;
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
            AppState::new(db, queue, Some("secret".to_string()), Duration::from_secs(30)),
            dir,
        )
    }

    fn lot_request(name: &str, spots: i64) -> CreateLotRequest {
        CreateLotRequest {
            name: name.to_string(),
            address: "12 Station Rd".to_string(),
            pincode: "560001".to_string(),
            hourly_rate: 50.0,
            spot_count: spots,
        }
    }

    #[tokio::test]
    async fn create_lot_queues_announcements() {
        let (state, _dir) = test_state().await;
        users::create_user(
            &state.db,
            &NewUser {
                username: "asha".to_string(),
                email: Some("asha@example.com".to_string()),
                full_name: None,
                address: None,
                pincode: None,
            },
        )
        .await
        .unwrap();

        let (status, Json(lot)) = create_lot(State(state.clone()), Json(lot_request("Central", 3)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(lot.declared_spots, 3);

        let entry = queue::dequeue(&state.db, MAIL_QUEUE).await.unwrap().unwrap();
        assert!(entry.payload.contains("Central"));
    }

    #[tokio::test]
    async fn create_lot_survives_announcement_failure() {
        let (state, _dir) = test_state().await;

        // Break the queue so the broadcast cannot be recorded.
        state
            .db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("DROP TABLE mail_queue;")?;
                Ok(())
            })
            .await
            .unwrap();

        let (status, Json(lot)) = create_lot(State(state), Json(lot_request("Central", 3)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(lot.id > 0);
    }

    #[tokio::test]
    async fn create_lot_rejects_bad_input() {
        let (state, _dir) = test_state().await;

        let err = create_lot(State(state.clone()), Json(lot_request("  ", 3)))
            .await
            .unwrap_err();
        assert!(matches!(err.0, ParkdError::Validation(_)));

        let err = create_lot(State(state.clone()), Json(lot_request("Central", 0)))
            .await
            .unwrap_err();
        assert!(matches!(err.0, ParkdError::Validation(_)));

        let mut negative = lot_request("Central", 3);
        negative.hourly_rate = -1.0;
        let err = create_lot(State(state), Json(negative)).await.unwrap_err();
        assert!(matches!(err.0, ParkdError::Validation(_)));
    }

    #[tokio::test]
    async fn lot_admin_lifecycle() {
        let (state, _dir) = test_state().await;
        let (_, Json(lot)) = create_lot(State(state.clone()), Json(lot_request("Central", 2)))
            .await
            .unwrap();

        let Json(updated) = update_lot(
            State(state.clone()),
            Path(lot.id),
            Json(LotChanges {
                hourly_rate: Some(80.0),
                ..LotChanges::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.hourly_rate, 80.0);

        let Json(resized) = resize_lot(
            State(state.clone()),
            Path(lot.id),
            Json(ResizeRequest { spot_count: 5 }),
        )
        .await
        .unwrap();
        assert_eq!(resized.declared_spots, 5);

        let Json(details) = lot_spots(State(state.clone()), Path(lot.id)).await.unwrap();
        assert_eq!(details.len(), 5);

        let Json(gone) = deactivate_lot(State(state.clone()), Path(lot.id)).await.unwrap();
        assert!(!gone.is_active);

        let err = lot_spots(State(state), Path(999)).await.unwrap_err();
        assert!(matches!(err.0, ParkdError::NotFound(_)));
    }

    #[tokio::test]
    async fn summary_reflects_system_state() {
        let (state, _dir) = test_state().await;
        create_lot(State(state.clone()), Json(lot_request("Central", 4)))
            .await
            .unwrap();

        let Json(summary) = summary(State(state)).await.unwrap();
        assert_eq!(summary.lot_count, 1);
        assert_eq!(summary.total_spots, 4);
    }
}
