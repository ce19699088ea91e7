//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod orders;
pub mod quotations;
pub mod remittances;
pub mod webhooks;

pub use orders::{
    add_order_component, create_order, delete_order, get_order, list_orders,
    refresh_all_logistics, refresh_order_invoices, refresh_order_logistics,
    remove_order_component, submit_order, sync_order, update_order, update_order_component,
};
pub use quotations::{
    add_quotation_component, convert_quotation, create_quotation, delete_quotation,
    get_quotation, list_quotations, remove_quotation_component, submit_quotation,
    sync_quotation, update_quotation, update_quotation_component,
};
pub use remittances::{
    add_remittance_item, create_remittance, delete_remittance, get_remittance,
    list_remittances, remove_remittance_item, submit_remittance, update_remittance,
    update_remittance_item,
};
pub use webhooks::{ti_asn_webhook, ti_order_webhook, ti_quote_webhook};
