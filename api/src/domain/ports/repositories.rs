//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).
//!
//! Records are stored as whole documents: `save` replaces the stored record
//! with the given one, nested line items included.

use async_trait::async_trait;

use crate::domain::entities::{
    NewOrder, NewQuotation, NewRemittance, Order, OrderFilter, OrderId, OrderStatus, Quotation,
    QuotationId, RemittanceId, RemittanceNotification,
};
use crate::error::DomainError;

/// Repository for Order documents
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Find an order by ID
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Find an order by the number TI assigned to it
    async fn find_by_ti_order_number(&self, number: &str) -> Result<Option<Order>, DomainError>;

    /// Find an order by customer purchase order number
    async fn find_by_purchase_order_number(&self, po: &str)
        -> Result<Option<Order>, DomainError>;

    /// List orders, newest first
    async fn list(
        &self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, DomainError>;

    /// Orders with a TI order number in any of the given statuses
    async fn find_submitted_with_status(
        &self,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, DomainError>;

    /// Create a new order
    async fn create(&self, order: &NewOrder, default_currency: &str)
        -> Result<Order, DomainError>;

    /// Replace a stored order
    async fn save(&self, order: &Order) -> Result<Order, DomainError>;

    /// Delete an order
    async fn delete(&self, id: &OrderId) -> Result<(), DomainError>;
}

/// Repository for Quotation documents
#[async_trait]
pub trait QuotationRepository: Send + Sync {
    /// Find a quotation by ID
    async fn find_by_id(&self, id: &QuotationId) -> Result<Option<Quotation>, DomainError>;

    /// Find a quotation by TI quote number
    async fn find_by_quote_number(&self, number: &str)
        -> Result<Option<Quotation>, DomainError>;

    /// List quotations, newest first
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Quotation>, DomainError>;

    /// Create a new quotation
    async fn create(
        &self,
        quotation: &NewQuotation,
        default_currency: &str,
    ) -> Result<Quotation, DomainError>;

    /// Replace a stored quotation
    async fn save(&self, quotation: &Quotation) -> Result<Quotation, DomainError>;

    /// Delete a quotation
    async fn delete(&self, id: &QuotationId) -> Result<(), DomainError>;
}

/// Repository for RemittanceNotification documents
#[async_trait]
pub trait RemittanceRepository: Send + Sync {
    /// Find a remittance by ID
    async fn find_by_id(
        &self,
        id: &RemittanceId,
    ) -> Result<Option<RemittanceNotification>, DomainError>;

    /// List remittances, newest first
    async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RemittanceNotification>, DomainError>;

    /// Create a new remittance notification
    async fn create(
        &self,
        remittance: &NewRemittance,
        default_currency: &str,
    ) -> Result<RemittanceNotification, DomainError>;

    /// Replace a stored remittance notification
    async fn save(
        &self,
        remittance: &RemittanceNotification,
    ) -> Result<RemittanceNotification, DomainError>;

    /// Delete a remittance notification
    async fn delete(&self, id: &RemittanceId) -> Result<(), DomainError>;
}
