//! SeaORM entities
//!
//! Table definitions for the document store. Nested line items, shipments,
//! invoices and remittance items are kept as JSONB columns.

pub mod orders;
pub mod quotations;
pub mod remittances;
