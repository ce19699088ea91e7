//! TI adapter
//!
//! HTTP client for the TI backlog API with OAuth client-credentials auth.

pub mod client;
pub mod token;

pub use client::TiClientImpl;
