//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

mod document;
pub mod order_repo;
pub mod quotation_repo;
pub mod remittance_repo;
pub mod schema;

#[cfg(test)]
mod integration_tests;

pub use order_repo::PostgresOrderRepository;
pub use quotation_repo::PostgresQuotationRepository;
pub use remittance_repo::PostgresRemittanceRepository;
pub use schema::ensure_schema;
