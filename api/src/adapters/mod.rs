//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod postgres;
pub mod ti;

pub use postgres::{
    ensure_schema, PostgresOrderRepository, PostgresQuotationRepository,
    PostgresRemittanceRepository,
};
pub use ti::TiClientImpl;
