//! Line item domain entities
//!
//! Components are the line items of orders and quotations. They are matched
//! against upstream records by TI part number, never by position.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Normalize a part number for matching (trimmed, upper-case)
pub fn normalize_part_number(part_number: &str) -> String {
    part_number.trim().to_uppercase()
}

/// Whether two part numbers refer to the same part
pub fn same_part(a: &str, b: &str) -> bool {
    normalize_part_number(a) == normalize_part_number(b)
}

/// A confirmed delivery schedule line for a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    /// TI schedule line identifier
    #[serde(default)]
    pub confirmation_number: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub estimated_ship_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_delivery_date: Option<NaiveDate>,
}

/// Key used to pair local and upstream confirmations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfirmationKey {
    Number(String),
    ShipDate(Option<NaiveDate>),
}

impl Confirmation {
    pub fn key(&self) -> ConfirmationKey {
        match &self.confirmation_number {
            Some(number) if !number.trim().is_empty() => {
                ConfirmationKey::Number(number.trim().to_string())
            }
            _ => ConfirmationKey::ShipDate(self.estimated_ship_date),
        }
    }
}

/// Largest quantity accepted on a single line
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Largest unit price accepted on a single line
pub fn max_unit_price() -> Decimal {
    Decimal::from(1_000_000)
}

/// Largest document total; keeps totals inside the numeric(18, 4) columns
pub fn max_document_total() -> Decimal {
    Decimal::from(10_000_000_000_000_i64)
}

/// Check a quantity against minimum order quantity and increment
pub fn check_order_quantity(quantity: i64, moq: i64, nq: i64) -> Result<(), DomainError> {
    if quantity <= 0 {
        return Err(DomainError::Validation(
            "quantity must be greater than zero".to_string(),
        ));
    }
    if quantity > MAX_QUANTITY || moq > MAX_QUANTITY || nq > MAX_QUANTITY {
        return Err(DomainError::Validation(format!(
            "quantity, moq and nq may not exceed {}",
            MAX_QUANTITY
        )));
    }
    if quantity < moq {
        return Err(DomainError::Validation(format!(
            "quantity {} is below the minimum order quantity {}{}",
            quantity,
            moq,
            nearest_hint(quantity, moq, nq)
        )));
    }
    if nq > 0 && quantity % nq != 0 {
        return Err(DomainError::Validation(format!(
            "quantity {} is not a multiple of the order increment {}{}",
            quantity,
            nq,
            nearest_hint(quantity, moq, nq)
        )));
    }
    Ok(())
}

fn nearest_hint(quantity: i64, moq: i64, nq: i64) -> String {
    suggested_quantity(quantity, moq, nq)
        .map(|q| format!(" (nearest valid: {})", q))
        .unwrap_or_default()
}

/// Smallest quantity >= `quantity` satisfying MOQ and NQ, if one fits in i64
pub fn suggested_quantity(quantity: i64, moq: i64, nq: i64) -> Option<i64> {
    let base = quantity.max(moq).max(1);
    if nq <= 1 {
        return Some(base);
    }
    match base % nq {
        0 => Some(base),
        remainder => base.checked_add(nq - remainder),
    }
}

fn check_unit_price(part_number: &str, price: Option<Decimal>) -> Result<(), DomainError> {
    let Some(price) = price else {
        return Ok(());
    };
    if price.is_sign_negative() {
        return Err(DomainError::Validation(format!(
            "unit_price for {} cannot be negative",
            part_number
        )));
    }
    if price > max_unit_price() {
        return Err(DomainError::Validation(format!(
            "unit_price for {} may not exceed {}",
            part_number,
            max_unit_price()
        )));
    }
    Ok(())
}

fn extended_price(
    part_number: &str,
    quantity: i64,
    price: Option<Decimal>,
) -> Result<Decimal, DomainError> {
    match price {
        None => Ok(Decimal::ZERO),
        Some(price) => price.checked_mul(Decimal::from(quantity)).ok_or_else(|| {
            DomainError::Validation(format!("line total for {} is out of range", part_number))
        }),
    }
}

/// Add one line to running (quantity, price) totals, rejecting overflow
pub fn accumulate_totals(
    totals: (i64, Decimal),
    quantity: i64,
    line_total: Decimal,
) -> Result<(i64, Decimal), DomainError> {
    let out_of_range = || DomainError::Validation("document totals are out of range".to_string());
    let quantity = totals.0.checked_add(quantity).ok_or_else(out_of_range)?;
    let price = totals
        .1
        .checked_add(line_total)
        .filter(|p| *p <= max_document_total())
        .ok_or_else(out_of_range)?;
    Ok((quantity, price))
}

/// An order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub ti_part_number: String,
    #[serde(default)]
    pub customer_part_number: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    /// Minimum order quantity, carried over from a quotation
    #[serde(default)]
    pub moq: Option<i64>,
    /// Order quantity increment, carried over from a quotation
    #[serde(default)]
    pub nq: Option<i64>,
    /// Upstream line status text
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub confirmations: Vec<Confirmation>,
}

impl Component {
    pub fn new(ti_part_number: impl Into<String>, quantity: i64) -> Self {
        Self {
            ti_part_number: ti_part_number.into(),
            customer_part_number: None,
            quantity,
            unit_price: None,
            moq: None,
            nq: None,
            status: None,
            confirmations: Vec::new(),
        }
    }

    pub fn line_total(&self) -> Result<Decimal, DomainError> {
        extended_price(&self.ti_part_number, self.quantity, self.unit_price)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.ti_part_number.trim().is_empty() {
            return Err(DomainError::Validation(
                "ti_part_number is required".to_string(),
            ));
        }
        check_unit_price(&self.ti_part_number, self.unit_price)?;
        check_order_quantity(
            self.quantity,
            self.moq.unwrap_or(1),
            self.nq.unwrap_or(1),
        )
    }

    /// Apply a partial edit
    pub fn apply(&mut self, update: &ComponentUpdate) {
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = update.unit_price {
            self.unit_price = Some(price);
        }
        if let Some(ref cpn) = update.customer_part_number {
            self.customer_part_number = Some(cpn.clone());
        }
    }
}

/// Partial edit of a line item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentUpdate {
    pub quantity: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub customer_part_number: Option<String>,
}

/// A quotation line item with pricing constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteComponent {
    pub ti_part_number: String,
    #[serde(default)]
    pub customer_part_number: Option<String>,
    pub quantity: i64,
    #[serde(default = "default_increment")]
    pub moq: i64,
    #[serde(default = "default_increment")]
    pub nq: i64,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

fn default_increment() -> i64 {
    1
}

impl QuoteComponent {
    pub fn line_total(&self) -> Result<Decimal, DomainError> {
        extended_price(&self.ti_part_number, self.quantity, self.unit_price)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.ti_part_number.trim().is_empty() {
            return Err(DomainError::Validation(
                "ti_part_number is required".to_string(),
            ));
        }
        if self.moq < 1 || self.nq < 1 {
            return Err(DomainError::Validation(format!(
                "moq and nq for {} must be at least 1",
                self.ti_part_number
            )));
        }
        check_unit_price(&self.ti_part_number, self.unit_price)?;
        check_order_quantity(self.quantity, self.moq, self.nq)
    }

    pub fn apply(&mut self, update: &ComponentUpdate) {
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = update.unit_price {
            self.unit_price = Some(price);
        }
        if let Some(ref cpn) = update.customer_part_number {
            self.customer_part_number = Some(cpn.clone());
        }
    }

    /// Turn a quoted line into an order line, keeping its constraints
    pub fn to_component(&self) -> Component {
        Component {
            ti_part_number: self.ti_part_number.clone(),
            customer_part_number: self.customer_part_number.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            moq: Some(self.moq),
            nq: Some(self.nq),
            status: None,
            confirmations: Vec::new(),
        }
    }
}
