//! Webhook handlers
//!
//! Handlers for documents TI pushes: order updates, advance shipment
//! notices and quote updates. Authentication happens in the Basic-auth
//! middleware in front of these routes.

use axum::{body::Bytes, extract::State, Json};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::ports::{TiAsn, TiOrder, TiQuote};
use crate::error::AppError;
use crate::AppState;

/// Acknowledgement returned to TI
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// Whether a local record was found and updated
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl WebhookAck {
    fn unmatched() -> Self {
        Self {
            matched: false,
            id: None,
            status: None,
        }
    }

    fn matched(id: String, status: String) -> Self {
        Self {
            matched: true,
            id: Some(id),
            status: Some(status),
        }
    }
}

fn parse_payload<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse webhook payload");
        AppError::BadRequest(format!("Invalid payload: {}", e))
    })
}

/// POST /webhooks/ti/orders
pub async fn ti_order_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let payload: TiOrder = parse_payload(&body)?;
    tracing::info!(ti_order_number = %payload.order_number, "Received TI order webhook");

    let ack = match state.order_service.apply_upstream_order(&payload).await? {
        Some(order) => WebhookAck::matched(order.id.to_string(), order.status.to_string()),
        None => WebhookAck::unmatched(),
    };
    Ok(Json(ack))
}

/// POST /webhooks/ti/asn
pub async fn ti_asn_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let payload: TiAsn = parse_payload(&body)?;
    tracing::info!(
        ti_order_number = %payload.order_number,
        shipments = payload.shipments.len(),
        "Received TI ship notice webhook"
    );

    let ack = match state.order_service.apply_upstream_asn(&payload).await? {
        Some(order) => WebhookAck::matched(order.id.to_string(), order.status.to_string()),
        None => WebhookAck::unmatched(),
    };
    Ok(Json(ack))
}

/// POST /webhooks/ti/quotes
pub async fn ti_quote_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let payload: TiQuote = parse_payload(&body)?;
    tracing::info!(quote_number = %payload.quote_number, "Received TI quote webhook");

    let ack = match state
        .quotation_service
        .apply_upstream_quote(&payload)
        .await?
    {
        Some(quotation) => {
            WebhookAck::matched(quotation.id.to_string(), quotation.status.to_string())
        }
        None => WebhookAck::unmatched(),
    };
    Ok(Json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_ack_serializes_without_ids() {
        let json = serde_json::to_value(WebhookAck::unmatched()).unwrap();
        assert_eq!(json, serde_json::json!({"matched": false}));
    }

    #[test]
    fn malformed_payload_is_a_bad_request() {
        let result: Result<TiOrder, _> = parse_payload(&Bytes::from_static(b"{\"orderStatus\":1}"));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
