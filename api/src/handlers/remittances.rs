//! Remittance handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::orders::default_limit;
use crate::domain::entities::{
    NewRemittance, RemittanceId, RemittanceItem, RemittanceItemUpdate, RemittanceNotification,
    RemittanceUpdate,
};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListRemittancesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /remittances
pub async fn list_remittances(
    State(state): State<AppState>,
    Query(query): Query<ListRemittancesQuery>,
) -> Result<Json<Vec<RemittanceNotification>>, AppError> {
    Ok(Json(
        state
            .remittance_service
            .list(query.limit, query.offset)
            .await?,
    ))
}

/// POST /remittances
pub async fn create_remittance(
    State(state): State<AppState>,
    Json(request): Json<NewRemittance>,
) -> Result<(StatusCode, Json<RemittanceNotification>), AppError> {
    let remittance = state.remittance_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(remittance)))
}

/// GET /remittances/:id
pub async fn get_remittance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RemittanceNotification>, AppError> {
    Ok(Json(
        state.remittance_service.get(&RemittanceId(id)).await?,
    ))
}

/// PATCH /remittances/:id
pub async fn update_remittance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<RemittanceUpdate>,
) -> Result<Json<RemittanceNotification>, AppError> {
    Ok(Json(
        state
            .remittance_service
            .update(&RemittanceId(id), update)
            .await?,
    ))
}

/// DELETE /remittances/:id
pub async fn delete_remittance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.remittance_service.delete(&RemittanceId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /remittances/:id/items
pub async fn add_remittance_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(item): Json<RemittanceItem>,
) -> Result<(StatusCode, Json<RemittanceNotification>), AppError> {
    let remittance = state
        .remittance_service
        .add_item(&RemittanceId(id), item)
        .await?;
    Ok((StatusCode::CREATED, Json(remittance)))
}

/// PATCH /remittances/:id/items/:invoice_number
pub async fn update_remittance_item(
    State(state): State<AppState>,
    Path((id, invoice_number)): Path<(Uuid, String)>,
    Json(update): Json<RemittanceItemUpdate>,
) -> Result<Json<RemittanceNotification>, AppError> {
    Ok(Json(
        state
            .remittance_service
            .update_item(&RemittanceId(id), &invoice_number, update)
            .await?,
    ))
}

/// DELETE /remittances/:id/items/:invoice_number
pub async fn remove_remittance_item(
    State(state): State<AppState>,
    Path((id, invoice_number)): Path<(Uuid, String)>,
) -> Result<Json<RemittanceNotification>, AppError> {
    Ok(Json(
        state
            .remittance_service
            .remove_item(&RemittanceId(id), &invoice_number)
            .await?,
    ))
}

/// POST /remittances/:id/submit
///
/// Send the notification to TI and settle the invoices it pays.
pub async fn submit_remittance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RemittanceNotification>, AppError> {
    Ok(Json(
        state.remittance_service.submit(&RemittanceId(id)).await?,
    ))
}
