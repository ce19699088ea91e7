//! Order domain entity
//!
//! A purchase order placed with TI. Line items are edited locally while the
//! order is a draft; after submission TI is the source of truth and the local
//! record is reconciled against it.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::{accumulate_totals, same_part, Component, ComponentUpdate};
use super::logistics::{Invoice, Shipment};
use crate::error::DomainError;

/// Unique identifier for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OrderId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Submitted,
    Confirmed,
    PartiallyShipped,
    Shipped,
    Invoiced,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Map TI order status text onto the local lifecycle
    pub fn from_ti(status: &str) -> Option<Self> {
        let normalized = status.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "draft" => Some(OrderStatus::Draft),
            "submitted" | "received" | "pending" | "open" => Some(OrderStatus::Submitted),
            "confirmed" | "processing" | "in_process" | "in_progress" | "scheduled"
            | "booked" => Some(OrderStatus::Confirmed),
            "partially_shipped" | "partial_shipment" | "partially_delivered" => {
                Some(OrderStatus::PartiallyShipped)
            }
            "shipped" | "delivered" | "complete" | "completed" | "closed" => {
                Some(OrderStatus::Shipped)
            }
            "invoiced" => Some(OrderStatus::Invoiced),
            "paid" => Some(OrderStatus::Paid),
            "cancelled" | "canceled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Position in the forward lifecycle; cancelled sits outside it
    pub fn rank(&self) -> u8 {
        match self {
            OrderStatus::Draft => 0,
            OrderStatus::Submitted => 1,
            OrderStatus::Confirmed => 2,
            OrderStatus::PartiallyShipped => 3,
            OrderStatus::Shipped => 4,
            OrderStatus::Invoiced => 5,
            OrderStatus::Paid => 6,
            OrderStatus::Cancelled => u8::MAX,
        }
    }

    /// Orders whose shipments are still worth polling for
    pub fn is_in_transit(&self) -> bool {
        matches!(
            self,
            OrderStatus::Submitted | OrderStatus::Confirmed | OrderStatus::PartiallyShipped
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Draft => write!(f, "draft"),
            OrderStatus::Submitted => write!(f, "submitted"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::PartiallyShipped => write!(f, "partially_shipped"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Invoiced => write!(f, "invoiced"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(OrderStatus::Draft),
            "submitted" => Ok(OrderStatus::Submitted),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "partially_shipped" => Ok(OrderStatus::PartiallyShipped),
            "shipped" => Ok(OrderStatus::Shipped),
            "invoiced" => Ok(OrderStatus::Invoiced),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

fn purchase_order_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\-_/.]{0,34}$").expect("purchase order pattern")
    })
}

/// Validate a customer purchase order number
pub fn validate_purchase_order_number(po: &str) -> Result<(), DomainError> {
    if purchase_order_pattern().is_match(po) {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "customer purchase order number '{}' must be 1-35 characters of letters, digits, '-', '_', '/' or '.'",
            po
        )))
    }
}

/// Sum quantities and extended prices across line items
pub fn component_totals(components: &[Component]) -> Result<(i64, Decimal), DomainError> {
    components.iter().try_fold((0, Decimal::ZERO), |totals, c| {
        accumulate_totals(totals, c.quantity, c.line_total()?)
    })
}

/// A purchase order
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_purchase_order_number: String,
    /// Order number assigned by TI on submission
    pub ti_order_number: Option<String>,
    /// TI quote the order was converted from
    pub quotation_number: Option<String>,
    pub status: OrderStatus,
    pub currency: String,
    pub ship_to: Option<String>,
    pub notes: Option<String>,
    pub components: Vec<Component>,
    pub shipments: Vec<Shipment>,
    pub invoices: Vec<Invoice>,
    pub total_quantity: i64,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn recompute_totals(&mut self) -> Result<(), DomainError> {
        let (quantity, price) = component_totals(&self.components)?;
        self.total_quantity = quantity;
        self.total_price = price;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn find_component(&self, part_number: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| same_part(&c.ti_part_number, part_number))
    }

    pub fn find_component_mut(&mut self, part_number: &str) -> Option<&mut Component> {
        self.components
            .iter_mut()
            .find(|c| same_part(&c.ti_part_number, part_number))
    }

    /// Whether the logistics of this order can be polled from TI
    pub fn is_trackable(&self) -> bool {
        self.ti_order_number.is_some() && self.status.is_in_transit()
    }

    /// Header fields stay editable for the whole lifecycle except cancellation
    pub fn ensure_editable(&self) -> Result<(), DomainError> {
        if self.status == OrderStatus::Cancelled {
            return Err(DomainError::Conflict(format!(
                "order {} is cancelled",
                self.id
            )));
        }
        Ok(())
    }

    /// Line items can only change before the order is submitted
    pub fn ensure_components_editable(&self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Draft {
            return Err(DomainError::Conflict(format!(
                "order {} is {}; line items can only be edited on drafts",
                self.id, self.status
            )));
        }
        Ok(())
    }

    pub fn add_component(&mut self, component: Component) -> Result<(), DomainError> {
        self.ensure_components_editable()?;
        component.validate()?;
        if self.find_component(&component.ti_part_number).is_some() {
            return Err(DomainError::AlreadyExists(format!(
                "part {} is already on order {}",
                component.ti_part_number, self.id
            )));
        }
        let (quantity, price) = accumulate_totals(
            (self.total_quantity, self.total_price),
            component.quantity,
            component.line_total()?,
        )?;
        self.components.push(component);
        self.total_quantity = quantity;
        self.total_price = price;
        Ok(())
    }

    pub fn update_component(
        &mut self,
        part_number: &str,
        update: &ComponentUpdate,
    ) -> Result<(), DomainError> {
        self.ensure_components_editable()?;
        let index = self
            .components
            .iter()
            .position(|c| same_part(&c.ti_part_number, part_number))
            .ok_or_else(|| {
                DomainError::NotFound(format!("part {} on order {}", part_number, self.id))
            })?;

        let mut edited = self.components.clone();
        edited[index].apply(update);
        edited[index].validate()?;
        let (quantity, price) = component_totals(&edited)?;

        self.components = edited;
        self.total_quantity = quantity;
        self.total_price = price;
        Ok(())
    }

    pub fn remove_component(&mut self, part_number: &str) -> Result<Component, DomainError> {
        self.ensure_components_editable()?;
        let index = self
            .components
            .iter()
            .position(|c| same_part(&c.ti_part_number, part_number))
            .ok_or_else(|| {
                DomainError::NotFound(format!("part {} on order {}", part_number, self.id))
            })?;

        let removed = self.components.remove(index);
        self.recompute_totals()?;
        Ok(removed)
    }

    /// Quantity of a part already covered by announced shipments
    pub fn shipped_quantity(&self, part_number: &str) -> i64 {
        self.shipments
            .iter()
            .flat_map(|s| s.items.iter())
            .filter(|item| same_part(&item.ti_part_number, part_number))
            .map(|item| item.quantity)
            .sum()
    }

    pub fn find_invoice_mut(&mut self, invoice_number: &str) -> Option<&mut Invoice> {
        self.invoices
            .iter_mut()
            .find(|i| i.invoice_number == invoice_number)
    }

    pub fn all_invoices_settled(&self) -> bool {
        !self.invoices.is_empty() && self.invoices.iter().all(Invoice::is_settled)
    }
}

/// Data needed to create a new order
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub customer_purchase_order_number: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub ship_to: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub quotation_number: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_purchase_order_number(&self.customer_purchase_order_number)?;
        for (index, component) in self.components.iter().enumerate() {
            component.validate()?;
            let duplicate = self.components[..index]
                .iter()
                .any(|c| same_part(&c.ti_part_number, &component.ti_part_number));
            if duplicate {
                return Err(DomainError::Validation(format!(
                    "part {} is listed more than once",
                    component.ti_part_number
                )));
            }
        }
        component_totals(&self.components)?;
        Ok(())
    }

    /// Build the stored document for this order
    pub fn into_order(self, id: OrderId, default_currency: &str) -> Result<Order, DomainError> {
        let now = Utc::now();
        let (total_quantity, total_price) = component_totals(&self.components)?;
        Ok(Order {
            id,
            customer_purchase_order_number: self.customer_purchase_order_number,
            ti_order_number: None,
            quotation_number: self.quotation_number,
            status: OrderStatus::Draft,
            currency: self
                .currency
                .unwrap_or_else(|| default_currency.to_string()),
            ship_to: self.ship_to,
            notes: self.notes,
            components: self.components,
            shipments: Vec::new(),
            invoices: Vec::new(),
            total_quantity,
            total_price,
            created_at: now,
            updated_at: now,
            last_synced_at: None,
        })
    }
}

/// Partial update of order header fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderUpdate {
    pub customer_purchase_order_number: Option<String>,
    pub currency: Option<String>,
    pub ship_to: Option<String>,
    pub notes: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Filter for listing orders
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::component::{max_unit_price, MAX_QUANTITY};

    fn draft_order() -> Order {
        NewOrder {
            customer_purchase_order_number: "PO-1001".to_string(),
            currency: None,
            ship_to: None,
            notes: None,
            quotation_number: None,
            components: vec![Component {
                unit_price: Some(Decimal::new(150, 2)),
                ..Component::new("LM358DR", 100)
            }],
        }
        .into_order(OrderId::new(), "USD")
        .unwrap()
    }

    #[test]
    fn new_order_starts_as_draft_with_totals() {
        let order = draft_order();
        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(order.currency, "USD");
        assert_eq!(order.total_quantity, 100);
        assert_eq!(order.total_price, Decimal::new(150, 0));
    }

    #[test]
    fn adding_component_recomputes_totals() {
        let mut order = draft_order();
        order
            .add_component(Component {
                unit_price: Some(Decimal::new(2, 0)),
                ..Component::new("TPS7A4501", 50)
            })
            .unwrap();
        assert_eq!(order.total_quantity, 150);
        assert_eq!(order.total_price, Decimal::new(250, 0));
    }

    #[test]
    fn duplicate_part_is_rejected() {
        let mut order = draft_order();
        let err = order.add_component(Component::new("lm358dr", 5)).unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[test]
    fn update_component_is_atomic_on_validation_failure() {
        let mut order = draft_order();
        let err = order
            .update_component(
                "LM358DR",
                &ComponentUpdate {
                    quantity: Some(0),
                    unit_price: Some(Decimal::new(9, 0)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let line = order.find_component("LM358DR").unwrap();
        assert_eq!(line.quantity, 100);
        assert_eq!(line.unit_price, Some(Decimal::new(150, 2)));
    }

    #[test]
    fn totals_beyond_storable_range_are_rejected() {
        // Each field is within its own bound; the extended price is not
        let expensive = || Component {
            unit_price: Some(max_unit_price()),
            ..Component::new("TPS7A4701RGWR", MAX_QUANTITY)
        };
        let new_order = NewOrder {
            customer_purchase_order_number: "PO-1002".to_string(),
            currency: None,
            ship_to: None,
            notes: None,
            quotation_number: None,
            components: vec![expensive()],
        };
        assert!(matches!(
            new_order.validate(),
            Err(DomainError::Validation(_))
        ));
        assert!(new_order.into_order(OrderId::new(), "USD").is_err());

        let mut order = draft_order();
        assert!(order.add_component(expensive()).is_err());
        assert!(order
            .update_component(
                "LM358DR",
                &ComponentUpdate {
                    quantity: Some(MAX_QUANTITY),
                    unit_price: Some(max_unit_price()),
                    ..Default::default()
                },
            )
            .is_err());
        assert_eq!(order.components.len(), 1);
        assert_eq!(order.components[0].quantity, 100);
        assert_eq!(order.total_quantity, 100);
        assert_eq!(order.total_price, Decimal::new(150, 0));
    }

    #[test]
    fn remove_component_recomputes_totals() {
        let mut order = draft_order();
        order.remove_component("LM358DR").unwrap();
        assert_eq!(order.total_quantity, 0);
        assert_eq!(order.total_price, Decimal::ZERO);
        assert!(order.remove_component("LM358DR").is_err());
    }

    #[test]
    fn components_locked_after_submission() {
        let mut order = draft_order();
        order.status = OrderStatus::Submitted;
        let err = order.add_component(Component::new("X", 1)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn trackable_requires_ti_number_and_open_status() {
        let mut order = draft_order();
        order.status = OrderStatus::Confirmed;
        assert!(!order.is_trackable());
        order.ti_order_number = Some("1234567".to_string());
        assert!(order.is_trackable());
        order.status = OrderStatus::Shipped;
        assert!(!order.is_trackable());
    }

    #[test]
    fn ti_status_text_is_mapped() {
        assert_eq!(
            OrderStatus::from_ti("Partially Shipped"),
            Some(OrderStatus::PartiallyShipped)
        );
        assert_eq!(OrderStatus::from_ti("CANCELED"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::from_ti("in-process"), Some(OrderStatus::Confirmed));
        assert_eq!(OrderStatus::from_ti("mystery"), None);
    }

    #[test]
    fn order_status_round_trips_through_text() {
        for status in [
            OrderStatus::Draft,
            OrderStatus::PartiallyShipped,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("bogus".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn purchase_order_numbers_are_validated() {
        assert!(validate_purchase_order_number("PO-2026/0042").is_ok());
        assert!(validate_purchase_order_number("").is_err());
        assert!(validate_purchase_order_number("PO 1").is_err());
        assert!(validate_purchase_order_number(&"A".repeat(36)).is_err());
    }

    #[test]
    fn new_order_rejects_duplicate_lines() {
        let new_order = NewOrder {
            customer_purchase_order_number: "PO-1".to_string(),
            currency: None,
            ship_to: None,
            notes: None,
            quotation_number: None,
            components: vec![Component::new("LM358DR", 1), Component::new("lm358dr", 2)],
        };
        assert!(new_order.validate().is_err());
    }
}
