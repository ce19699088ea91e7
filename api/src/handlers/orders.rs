//! Order handlers
//!
//! Endpoints for order editing, submission and TI synchronization.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::LogisticsRefreshSummary;
use crate::domain::entities::{
    Component, ComponentUpdate, NewOrder, Order, OrderFilter, OrderId, OrderStatus, OrderUpdate,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing orders
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

pub(crate) fn default_limit() -> i64 {
    20
}

/// Order as listed, without nested documents
#[derive(Debug, Serialize)]
pub struct OrderSummaryResponse {
    pub id: String,
    pub customer_purchase_order_number: String,
    pub ti_order_number: Option<String>,
    pub status: OrderStatus,
    pub currency: String,
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl From<Order> for OrderSummaryResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            line_count: order.components.len(),
            customer_purchase_order_number: order.customer_purchase_order_number,
            ti_order_number: order.ti_order_number,
            status: order.status,
            currency: order.currency,
            total_quantity: order.total_quantity,
            total_price: order.total_price,
            created_at: order.created_at,
            last_synced_at: order.last_synced_at,
        }
    }
}

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderSummaryResponse>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let orders = state
        .order_service
        .list(&OrderFilter { status }, query.limit, query.offset)
        .await?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state.order_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.order_service.get(&OrderId(id)).await?))
}

/// PATCH /orders/:id
///
/// Partial header update. The only status change accepted is cancellation.
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<OrderUpdate>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.order_service.update(&OrderId(id), update).await?))
}

/// DELETE /orders/:id
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.order_service.delete(&OrderId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /orders/:id/components
pub async fn add_order_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(component): Json<Component>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state
        .order_service
        .add_component(&OrderId(id), component)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /orders/:id/components/:part_number
pub async fn update_order_component(
    State(state): State<AppState>,
    Path((id, part_number)): Path<(Uuid, String)>,
    Json(update): Json<ComponentUpdate>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .order_service
        .update_component(&OrderId(id), &part_number, update)
        .await?;
    Ok(Json(order))
}

/// DELETE /orders/:id/components/:part_number
pub async fn remove_order_component(
    State(state): State<AppState>,
    Path((id, part_number)): Path<(Uuid, String)>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .order_service
        .remove_component(&OrderId(id), &part_number)
        .await?;
    Ok(Json(order))
}

/// POST /orders/:id/submit
pub async fn submit_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.order_service.submit(&OrderId(id)).await?))
}

/// POST /orders/:id/sync
pub async fn sync_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.order_service.sync(&OrderId(id)).await?))
}

/// POST /orders/:id/logistics/refresh
pub async fn refresh_order_logistics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state.order_service.refresh_logistics(&OrderId(id)).await?,
    ))
}

/// POST /orders/logistics/refresh
///
/// Refresh shipments for every order still in transit.
pub async fn refresh_all_logistics(
    State(state): State<AppState>,
) -> Result<Json<LogisticsRefreshSummary>, AppError> {
    Ok(Json(state.order_service.refresh_all_logistics().await?))
}

/// POST /orders/:id/invoices/refresh
pub async fn refresh_order_invoices(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state.order_service.refresh_invoices(&OrderId(id)).await?,
    ))
}
