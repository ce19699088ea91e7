//! Shipment and invoice records attached to an order

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A shipped quantity of one part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentItem {
    pub ti_part_number: String,
    pub quantity: i64,
}

/// A shipment announced through an advance shipment notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub shipment_id: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub ship_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<ShipmentItem>,
}

/// An invoice (financial document) issued against an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: String,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub currency: String,
    pub amount: Decimal,
    /// Sum of remitted payments recorded locally
    #[serde(default)]
    pub paid_amount: Decimal,
}

impl Invoice {
    pub fn is_settled(&self) -> bool {
        self.paid_amount >= self.amount
    }

    pub fn outstanding(&self) -> Decimal {
        (self.amount - self.paid_amount).max(Decimal::ZERO)
    }
}
