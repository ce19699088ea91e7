//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod repositories;
pub mod ti;

pub use repositories::{OrderRepository, QuotationRepository, RemittanceRepository};
pub use ti::{
    TiAsn, TiClient, TiInvoice, TiOrder, TiOrderLine, TiOrderRequest, TiOrderRequestLine,
    TiQuote, TiQuoteLine, TiQuoteRequest, TiQuoteRequestLine, TiRemittanceAck, TiRemittanceLine,
    TiRemittanceRequest, TiSchedule, TiShipment, TiShipmentLine,
};
