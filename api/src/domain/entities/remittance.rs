//! Remittance notification domain entity
//!
//! Tells TI which invoices a payment covers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::max_document_total;
use crate::error::DomainError;

/// Unique identifier for a remittance notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemittanceId(pub Uuid);

impl RemittanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RemittanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RemittanceId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RemittanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemittanceStatus {
    Draft,
    Submitted,
}

impl std::fmt::Display for RemittanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemittanceStatus::Draft => write!(f, "draft"),
            RemittanceStatus::Submitted => write!(f, "submitted"),
        }
    }
}

impl std::str::FromStr for RemittanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(RemittanceStatus::Draft),
            "submitted" => Ok(RemittanceStatus::Submitted),
            _ => Err(format!("Unknown remittance status: {}", s)),
        }
    }
}

/// A payment against one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemittanceItem {
    pub invoice_number: String,
    /// TI order number the invoice belongs to, if known
    #[serde(default)]
    pub order_number: Option<String>,
    pub amount: Decimal,
}

impl RemittanceItem {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.invoice_number.trim().is_empty() {
            return Err(DomainError::Validation(
                "invoice_number is required".to_string(),
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::Validation(format!(
                "amount for invoice {} must be positive",
                self.invoice_number
            )));
        }
        if self.amount > max_document_total() {
            return Err(DomainError::Validation(format!(
                "amount for invoice {} exceeds {}",
                self.invoice_number,
                max_document_total()
            )));
        }
        Ok(())
    }
}

/// Sum item amounts, refusing totals that cannot be stored
pub fn remittance_total(items: &[RemittanceItem]) -> Result<Decimal, DomainError> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.amount))
        .filter(|total| *total <= max_document_total())
        .ok_or_else(|| DomainError::Validation("remittance total is out of range".to_string()))
}

/// Partial edit of a remittance item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemittanceItemUpdate {
    pub amount: Option<Decimal>,
    pub order_number: Option<String>,
}

/// A remittance notification
#[derive(Debug, Clone, Serialize)]
pub struct RemittanceNotification {
    pub id: RemittanceId,
    pub reference: String,
    pub status: RemittanceStatus,
    /// Reference assigned by TI on submission
    pub ti_reference: Option<String>,
    pub payment_date: NaiveDate,
    pub currency: String,
    pub payment_method: Option<String>,
    pub items: Vec<RemittanceItem>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RemittanceNotification {
    pub fn recompute_total(&mut self) -> Result<(), DomainError> {
        self.total_amount = remittance_total(&self.items)?;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn ensure_draft(&self) -> Result<(), DomainError> {
        if self.status != RemittanceStatus::Draft {
            return Err(DomainError::Conflict(format!(
                "remittance {} was already submitted",
                self.id
            )));
        }
        Ok(())
    }

    fn position(&self, invoice_number: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|i| i.invoice_number.trim() == invoice_number.trim())
    }

    pub fn add_item(&mut self, item: RemittanceItem) -> Result<(), DomainError> {
        self.ensure_draft()?;
        item.validate()?;
        if self.position(&item.invoice_number).is_some() {
            return Err(DomainError::AlreadyExists(format!(
                "invoice {} is already on remittance {}",
                item.invoice_number, self.id
            )));
        }
        let total = self
            .total_amount
            .checked_add(item.amount)
            .filter(|total| *total <= max_document_total())
            .ok_or_else(|| {
                DomainError::Validation("remittance total is out of range".to_string())
            })?;
        self.items.push(item);
        self.total_amount = total;
        Ok(())
    }

    pub fn update_item(
        &mut self,
        invoice_number: &str,
        update: &RemittanceItemUpdate,
    ) -> Result<(), DomainError> {
        self.ensure_draft()?;
        let index = self.position(invoice_number).ok_or_else(|| {
            DomainError::NotFound(format!(
                "invoice {} on remittance {}",
                invoice_number, self.id
            ))
        })?;

        let mut edited = self.items.clone();
        if let Some(amount) = update.amount {
            edited[index].amount = amount;
        }
        if let Some(ref order_number) = update.order_number {
            edited[index].order_number = Some(order_number.clone());
        }
        edited[index].validate()?;
        let total = remittance_total(&edited)?;

        self.items = edited;
        self.total_amount = total;
        Ok(())
    }

    pub fn remove_item(&mut self, invoice_number: &str) -> Result<RemittanceItem, DomainError> {
        self.ensure_draft()?;
        let index = self.position(invoice_number).ok_or_else(|| {
            DomainError::NotFound(format!(
                "invoice {} on remittance {}",
                invoice_number, self.id
            ))
        })?;
        let removed = self.items.remove(index);
        self.recompute_total()?;
        Ok(removed)
    }
}

/// Data needed to create a new remittance notification
#[derive(Debug, Clone, Deserialize)]
pub struct NewRemittance {
    pub reference: String,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items: Vec<RemittanceItem>,
}

impl NewRemittance {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.reference.trim().is_empty() {
            return Err(DomainError::Validation("reference is required".to_string()));
        }
        for (index, item) in self.items.iter().enumerate() {
            item.validate()?;
            if self.items[..index]
                .iter()
                .any(|i| i.invoice_number.trim() == item.invoice_number.trim())
            {
                return Err(DomainError::Validation(format!(
                    "invoice {} is listed more than once",
                    item.invoice_number
                )));
            }
        }
        remittance_total(&self.items)?;
        Ok(())
    }

    pub fn into_remittance(
        self,
        id: RemittanceId,
        default_currency: &str,
    ) -> Result<RemittanceNotification, DomainError> {
        let now = Utc::now();
        let total_amount = remittance_total(&self.items)?;
        Ok(RemittanceNotification {
            id,
            reference: self.reference,
            status: RemittanceStatus::Draft,
            ti_reference: None,
            payment_date: self.payment_date,
            currency: self
                .currency
                .unwrap_or_else(|| default_currency.to_string()),
            payment_method: self.payment_method,
            items: self.items,
            total_amount,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of remittance header fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemittanceUpdate {
    pub reference: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
}
