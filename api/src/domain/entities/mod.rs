//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod component;
pub mod logistics;
pub mod order;
pub mod quotation;
pub mod remittance;

pub use component::{
    normalize_part_number, same_part, Component, ComponentUpdate, Confirmation, QuoteComponent,
};
pub use logistics::{Invoice, Shipment, ShipmentItem};
pub use order::{
    validate_purchase_order_number, NewOrder, Order, OrderFilter, OrderId, OrderStatus,
    OrderUpdate,
};
pub use quotation::{NewQuotation, Quotation, QuotationId, QuotationStatus, QuotationUpdate};
pub use remittance::{
    NewRemittance, RemittanceId, RemittanceItem, RemittanceItemUpdate, RemittanceNotification,
    RemittanceStatus, RemittanceUpdate,
};
