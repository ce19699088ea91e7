//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and the TI API.

pub mod order_service;
pub mod quotation_service;
pub mod reconcile;
pub mod remittance_service;

pub use order_service::{LogisticsRefreshSummary, OrderService};
pub use quotation_service::{ConvertQuotation, QuotationService};
pub use remittance_service::RemittanceService;
