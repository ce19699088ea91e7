//! Quotation handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::orders::default_limit;
use crate::app::ConvertQuotation;
use crate::domain::entities::{
    ComponentUpdate, NewQuotation, Order, Quotation, QuotationId, QuotationUpdate,
    QuoteComponent,
};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuotationsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /quotations
pub async fn list_quotations(
    State(state): State<AppState>,
    Query(query): Query<ListQuotationsQuery>,
) -> Result<Json<Vec<Quotation>>, AppError> {
    Ok(Json(
        state
            .quotation_service
            .list(query.limit, query.offset)
            .await?,
    ))
}

/// POST /quotations
pub async fn create_quotation(
    State(state): State<AppState>,
    Json(request): Json<NewQuotation>,
) -> Result<(StatusCode, Json<Quotation>), AppError> {
    let quotation = state.quotation_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(quotation)))
}

/// GET /quotations/:id
pub async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Quotation>, AppError> {
    Ok(Json(state.quotation_service.get(&QuotationId(id)).await?))
}

/// PATCH /quotations/:id
pub async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<QuotationUpdate>,
) -> Result<Json<Quotation>, AppError> {
    Ok(Json(
        state
            .quotation_service
            .update(&QuotationId(id), update)
            .await?,
    ))
}

/// DELETE /quotations/:id
pub async fn delete_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.quotation_service.delete(&QuotationId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /quotations/:id/components
pub async fn add_quotation_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(component): Json<QuoteComponent>,
) -> Result<(StatusCode, Json<Quotation>), AppError> {
    let quotation = state
        .quotation_service
        .add_component(&QuotationId(id), component)
        .await?;
    Ok((StatusCode::CREATED, Json(quotation)))
}

/// PATCH /quotations/:id/components/:part_number
pub async fn update_quotation_component(
    State(state): State<AppState>,
    Path((id, part_number)): Path<(Uuid, String)>,
    Json(update): Json<ComponentUpdate>,
) -> Result<Json<Quotation>, AppError> {
    Ok(Json(
        state
            .quotation_service
            .update_component(&QuotationId(id), &part_number, update)
            .await?,
    ))
}

/// DELETE /quotations/:id/components/:part_number
pub async fn remove_quotation_component(
    State(state): State<AppState>,
    Path((id, part_number)): Path<(Uuid, String)>,
) -> Result<Json<Quotation>, AppError> {
    Ok(Json(
        state
            .quotation_service
            .remove_component(&QuotationId(id), &part_number)
            .await?,
    ))
}

/// POST /quotations/:id/submit
pub async fn submit_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Quotation>, AppError> {
    Ok(Json(
        state.quotation_service.submit(&QuotationId(id)).await?,
    ))
}

/// POST /quotations/:id/sync
pub async fn sync_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Quotation>, AppError> {
    Ok(Json(state.quotation_service.sync(&QuotationId(id)).await?))
}

/// POST /quotations/:id/order
///
/// Create a draft order from an active quotation.
pub async fn convert_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConvertQuotation>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state
        .quotation_service
        .convert_to_order(&QuotationId(id), request)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
