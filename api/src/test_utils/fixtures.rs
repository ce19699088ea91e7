//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::entities::{
    Component, NewOrder, NewQuotation, NewRemittance, QuoteComponent, RemittanceItem,
};
use crate::domain::ports::{TiInvoice, TiOrder, TiOrderLine, TiQuote, TiQuoteLine};

/// A component priced in cents
pub fn priced_component(part: &str, quantity: i64, unit_price_cents: i64) -> Component {
    Component {
        unit_price: Some(Decimal::new(unit_price_cents, 2)),
        ..Component::new(part, quantity)
    }
}

/// A draft order request with one line: LM358DR, 100 @ 0.25
pub fn new_order(po: &str) -> NewOrder {
    NewOrder {
        customer_purchase_order_number: po.to_string(),
        currency: None,
        ship_to: Some("Dock 4, 100 Main St".to_string()),
        notes: None,
        quotation_number: None,
        components: vec![priced_component("LM358DR", 100, 25)],
    }
}

/// A draft quotation request with one unpriced line: TMP117AIDRVR x 250
pub fn new_quotation(reference: &str) -> NewQuotation {
    NewQuotation {
        reference: reference.to_string(),
        currency: None,
        components: vec![QuoteComponent {
            ti_part_number: "TMP117AIDRVR".to_string(),
            customer_part_number: None,
            quantity: 250,
            moq: 1,
            nq: 1,
            unit_price: None,
        }],
    }
}

/// A draft remittance paying one invoice
pub fn new_remittance(
    reference: &str,
    invoice_number: &str,
    order_number: Option<&str>,
    amount_cents: i64,
) -> NewRemittance {
    NewRemittance {
        reference: reference.to_string(),
        payment_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
        currency: None,
        payment_method: Some("wire".to_string()),
        items: vec![RemittanceItem {
            invoice_number: invoice_number.to_string(),
            order_number: order_number.map(str::to_string),
            amount: Decimal::new(amount_cents, 2),
        }],
    }
}

/// TI view of an order carrying the LM358DR line from `new_order`
pub fn ti_order_for(order_number: &str, po: &str, status: &str) -> TiOrder {
    TiOrder {
        order_number: order_number.to_string(),
        customer_purchase_order_number: Some(po.to_string()),
        order_status: Some(status.to_string()),
        currency: Some("USD".to_string()),
        line_items: vec![TiOrderLine {
            ti_part_number: "LM358DR".to_string(),
            customer_part_number: None,
            quantity: 100,
            unit_price: Some(Decimal::new(25, 2)),
            status: None,
            schedules: Vec::new(),
        }],
    }
}

/// TI view of a quote for the TMP117AIDRVR line from `new_quotation`
pub fn ti_quote_for(quote_number: &str, status: &str) -> TiQuote {
    TiQuote {
        quote_number: quote_number.to_string(),
        quote_status: Some(status.to_string()),
        currency: Some("USD".to_string()),
        expiration_date: None,
        line_items: vec![TiQuoteLine {
            ti_part_number: "TMP117AIDRVR".to_string(),
            customer_part_number: None,
            quantity: 250,
            minimum_order_quantity: Some(250),
            order_increment: Some(250),
            price: Some(Decimal::new(40, 2)),
        }],
    }
}

/// A TI invoice for a whole-unit amount
pub fn ti_invoice(invoice_number: &str, order_number: &str, amount: i64) -> TiInvoice {
    TiInvoice {
        invoice_number: invoice_number.to_string(),
        order_number: Some(order_number.to_string()),
        invoice_date: NaiveDate::from_ymd_opt(2026, 10, 1),
        due_date: NaiveDate::from_ymd_opt(2026, 10, 31),
        currency: "USD".to_string(),
        total_amount: Decimal::new(amount, 0),
    }
}
