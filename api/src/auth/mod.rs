//! Authentication
//!
//! Inbound TI webhooks authenticate with HTTP Basic credentials.

pub mod basic;

pub use basic::{basic_auth_middleware, WebhookCredentials};
