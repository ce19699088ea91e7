//! Quotation domain entity
//!
//! A price quote requested from TI. Quoted lines carry the minimum order
//! quantity and order increment that any resulting order must respect.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::{accumulate_totals, same_part, ComponentUpdate, QuoteComponent};
use crate::error::DomainError;

/// Unique identifier for a quotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotationId(pub Uuid);

impl QuotationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for QuotationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for QuotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quotation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Draft,
    Requested,
    Active,
    Expired,
    Ordered,
    Rejected,
}

impl QuotationStatus {
    /// Map TI quote status text onto the local lifecycle
    pub fn from_ti(status: &str) -> Option<Self> {
        match status.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" | "requested" | "submitted" | "in_review" => Some(QuotationStatus::Requested),
            "active" | "approved" | "quoted" | "open" => Some(QuotationStatus::Active),
            "expired" => Some(QuotationStatus::Expired),
            "ordered" | "closed" | "converted" => Some(QuotationStatus::Ordered),
            "rejected" | "declined" | "cancelled" | "canceled" => Some(QuotationStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotationStatus::Draft => write!(f, "draft"),
            QuotationStatus::Requested => write!(f, "requested"),
            QuotationStatus::Active => write!(f, "active"),
            QuotationStatus::Expired => write!(f, "expired"),
            QuotationStatus::Ordered => write!(f, "ordered"),
            QuotationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for QuotationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(QuotationStatus::Draft),
            "requested" => Ok(QuotationStatus::Requested),
            "active" => Ok(QuotationStatus::Active),
            "expired" => Ok(QuotationStatus::Expired),
            "ordered" => Ok(QuotationStatus::Ordered),
            "rejected" => Ok(QuotationStatus::Rejected),
            _ => Err(format!("Unknown quotation status: {}", s)),
        }
    }
}

/// Sum quantities and extended prices across quoted lines
pub fn quote_totals(components: &[QuoteComponent]) -> Result<(i64, Decimal), DomainError> {
    components.iter().try_fold((0, Decimal::ZERO), |totals, c| {
        accumulate_totals(totals, c.quantity, c.line_total()?)
    })
}

/// A quotation
#[derive(Debug, Clone, Serialize)]
pub struct Quotation {
    pub id: QuotationId,
    /// Local label for the quote request
    pub reference: String,
    /// Quote number assigned by TI
    pub quote_number: Option<String>,
    pub status: QuotationStatus,
    pub currency: String,
    pub expiration_date: Option<NaiveDate>,
    pub components: Vec<QuoteComponent>,
    pub total_quantity: i64,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quotation {
    pub fn recompute_totals(&mut self) -> Result<(), DomainError> {
        let (quantity, price) = quote_totals(&self.components)?;
        self.total_quantity = quantity;
        self.total_price = price;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn find_component(&self, part_number: &str) -> Option<&QuoteComponent> {
        self.components
            .iter()
            .find(|c| same_part(&c.ti_part_number, part_number))
    }

    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|expires| expires < today)
    }

    /// Whether an order may still be placed against this quote
    pub fn ensure_orderable(&self, today: NaiveDate) -> Result<(), DomainError> {
        if self.status != QuotationStatus::Active {
            return Err(DomainError::Conflict(format!(
                "quotation {} is {}; only active quotes can be ordered",
                self.id, self.status
            )));
        }
        if self.is_expired_on(today) {
            return Err(DomainError::Conflict(format!(
                "quotation {} expired on {}",
                self.id,
                self.expiration_date
                    .map(|d| d.to_string())
                    .unwrap_or_default()
            )));
        }
        if self.components.is_empty() {
            return Err(DomainError::Validation(format!(
                "quotation {} has no line items",
                self.id
            )));
        }
        Ok(())
    }

    pub fn ensure_components_editable(&self) -> Result<(), DomainError> {
        if self.status != QuotationStatus::Draft {
            return Err(DomainError::Conflict(format!(
                "quotation {} is {}; line items can only be edited on drafts",
                self.id, self.status
            )));
        }
        Ok(())
    }

    pub fn add_component(&mut self, component: QuoteComponent) -> Result<(), DomainError> {
        self.ensure_components_editable()?;
        component.validate()?;
        if self.find_component(&component.ti_part_number).is_some() {
            return Err(DomainError::AlreadyExists(format!(
                "part {} is already on quotation {}",
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
                DomainError::NotFound(format!("part {} on quotation {}", part_number, self.id))
            })?;

        let mut edited = self.components.clone();
        edited[index].apply(update);
        edited[index].validate()?;
        let (quantity, price) = quote_totals(&edited)?;

        self.components = edited;
        self.total_quantity = quantity;
        self.total_price = price;
        Ok(())
    }

    pub fn remove_component(&mut self, part_number: &str) -> Result<QuoteComponent, DomainError> {
        self.ensure_components_editable()?;
        let index = self
            .components
            .iter()
            .position(|c| same_part(&c.ti_part_number, part_number))
            .ok_or_else(|| {
                DomainError::NotFound(format!("part {} on quotation {}", part_number, self.id))
            })?;

        let removed = self.components.remove(index);
        self.recompute_totals()?;
        Ok(removed)
    }
}

/// Data needed to create a new quotation
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuotation {
    pub reference: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub components: Vec<QuoteComponent>,
}

impl NewQuotation {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.reference.trim().is_empty() {
            return Err(DomainError::Validation("reference is required".to_string()));
        }
        for (index, component) in self.components.iter().enumerate() {
            component.validate()?;
            if self.components[..index]
                .iter()
                .any(|c| same_part(&c.ti_part_number, &component.ti_part_number))
            {
                return Err(DomainError::Validation(format!(
                    "part {} is listed more than once",
                    component.ti_part_number
                )));
            }
        }
        quote_totals(&self.components)?;
        Ok(())
    }

    pub fn into_quotation(
        self,
        id: QuotationId,
        default_currency: &str,
    ) -> Result<Quotation, DomainError> {
        let now = Utc::now();
        let (total_quantity, total_price) = quote_totals(&self.components)?;
        Ok(Quotation {
            id,
            reference: self.reference,
            quote_number: None,
            status: QuotationStatus::Draft,
            currency: self
                .currency
                .unwrap_or_else(|| default_currency.to_string()),
            expiration_date: None,
            components: self.components,
            total_quantity,
            total_price,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of quotation header fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotationUpdate {
    pub reference: Option<String>,
    pub currency: Option<String>,
}
