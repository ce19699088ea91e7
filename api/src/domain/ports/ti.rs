//! TI backlog API port trait
//!
//! Defines the interface for interacting with the TI backlog API, along with
//! the wire representations it exchanges. Field names follow TI's camelCase
//! JSON contract.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TiError;

/// Helper to deserialize null as default (empty vec, etc.)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Schedule line confirmed by TI for an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiSchedule {
    #[serde(default)]
    pub schedule_line_number: Option<String>,
    pub scheduled_quantity: i64,
    #[serde(default)]
    pub estimated_ship_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_delivery_date: Option<NaiveDate>,
}

/// Order line as reported by TI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiOrderLine {
    pub ti_part_number: String,
    #[serde(default)]
    pub customer_part_number: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub schedules: Vec<TiSchedule>,
}

/// Order as reported by TI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiOrder {
    pub order_number: String,
    #[serde(default)]
    pub customer_purchase_order_number: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub line_items: Vec<TiOrderLine>,
}

/// Line of an order submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiOrderRequestLine {
    pub ti_part_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_part_number: Option<String>,
    pub quantity: i64,
}

/// Order submission body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiOrderRequest {
    pub customer_purchase_order_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to: Option<String>,
    pub line_items: Vec<TiOrderRequestLine>,
}

/// Quote line as reported by TI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiQuoteLine {
    pub ti_part_number: String,
    #[serde(default)]
    pub customer_part_number: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub minimum_order_quantity: Option<i64>,
    #[serde(default)]
    pub order_increment: Option<i64>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Quote as reported by TI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiQuote {
    pub quote_number: String,
    #[serde(default)]
    pub quote_status: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub line_items: Vec<TiQuoteLine>,
}

/// Line of a quote request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiQuoteRequestLine {
    pub ti_part_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_part_number: Option<String>,
    pub quantity: i64,
}

/// Quote request body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiQuoteRequest {
    pub customer_reference: String,
    pub currency: String,
    pub line_items: Vec<TiQuoteRequestLine>,
}

/// Item on an advance shipment notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiShipmentLine {
    pub ti_part_number: String,
    pub shipped_quantity: i64,
}

/// One shipment on an advance shipment notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiShipment {
    pub shipment_number: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub ship_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub line_items: Vec<TiShipmentLine>,
}

/// Advance shipment notice for an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiAsn {
    pub order_number: String,
    #[serde(default)]
    pub customer_purchase_order_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub shipments: Vec<TiShipment>,
}

/// Invoice issued by TI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiInvoice {
    pub invoice_number: String,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub currency: String,
    pub total_amount: Decimal,
}

/// Line of a remittance notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiRemittanceLine {
    pub invoice_number: String,
    pub amount_paid: Decimal,
}

/// Remittance notification body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiRemittanceRequest {
    pub remittance_reference: String,
    pub payment_date: NaiveDate,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub total_amount: Decimal,
    pub line_items: Vec<TiRemittanceLine>,
}

/// Acknowledgement of a remittance notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiRemittanceAck {
    pub remittance_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Port trait for TI backlog API operations
#[async_trait]
pub trait TiClient: Send + Sync {
    // Quotes

    /// Request a new quote
    async fn create_quote(&self, request: &TiQuoteRequest) -> Result<TiQuote, TiError>;

    /// Get a quote by TI quote number
    async fn get_quote(&self, quote_number: &str) -> Result<TiQuote, TiError>;

    // Orders

    /// Submit an order
    async fn create_order(&self, request: &TiOrderRequest) -> Result<TiOrder, TiError>;

    /// Get an order by TI order number
    async fn get_order(&self, order_number: &str) -> Result<TiOrder, TiError>;

    // Logistics and finance

    /// Get the advance shipment notices for an order
    async fn get_asn(&self, order_number: &str) -> Result<TiAsn, TiError>;

    /// Get the invoices issued for an order
    async fn get_invoices(&self, order_number: &str) -> Result<Vec<TiInvoice>, TiError>;

    /// Send a remittance notification
    async fn submit_remittance(
        &self,
        request: &TiRemittanceRequest,
    ) -> Result<TiRemittanceAck, TiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_payload_tolerates_null_collections() {
        let order: TiOrder = serde_json::from_str(
            r#"{
                "orderNumber": "7000123",
                "orderStatus": "Processing",
                "lineItems": [
                    {"tiPartNumber": "LM358DR", "quantity": 2500, "unitPrice": 0.12, "schedules": null}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(order.order_number, "7000123");
        assert_eq!(order.line_items[0].unit_price, Some(Decimal::new(12, 2)));
        assert!(order.line_items[0].schedules.is_empty());
    }

    #[test]
    fn order_request_uses_camel_case() {
        let request = TiOrderRequest {
            customer_purchase_order_number: "PO-1".to_string(),
            quote_number: None,
            checkout_profile_id: None,
            ship_to: None,
            line_items: vec![TiOrderRequestLine {
                ti_part_number: "LM358DR".to_string(),
                customer_part_number: None,
                quantity: 2500,
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["customerPurchaseOrderNumber"], "PO-1");
        assert_eq!(json["lineItems"][0]["tiPartNumber"], "LM358DR");
        assert!(json.get("quoteNumber").is_none());
    }
}
