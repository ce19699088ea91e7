//! Reconciliation between local documents and TI records
//!
//! TI is authoritative for anything it reports. Lines are paired by
//! normalized TI part number, schedules by confirmation number (or ship date
//! when TI sends no number). Totals are recomputed after every merge.

use chrono::Utc;

use crate::domain::entities::{
    normalize_part_number, same_part, Component, Confirmation, Invoice, Order, OrderStatus,
    QuoteComponent, Quotation, QuotationStatus, Shipment, ShipmentItem,
};
use crate::domain::ports::{TiAsn, TiInvoice, TiOrder, TiOrderLine, TiQuote, TiSchedule};
use crate::error::DomainError;

/// Outcome of merging upstream lines into a local document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Local lines updated from upstream
    pub matched: usize,
    /// Upstream lines appended locally
    pub added: usize,
    /// Local lines TI did not report
    pub retained: usize,
}

fn confirmation_from_schedule(schedule: &TiSchedule) -> Confirmation {
    Confirmation {
        confirmation_number: schedule.schedule_line_number.clone(),
        quantity: schedule.scheduled_quantity,
        estimated_ship_date: schedule.estimated_ship_date,
        estimated_delivery_date: schedule.estimated_delivery_date,
    }
}

/// Merge TI schedule lines into the local confirmations of one line.
///
/// Every upstream schedule yields exactly one confirmation. A local entry
/// with the same key fills in dates TI left out; local entries TI no longer
/// reports are dropped. When TI reports no schedules at all the local list
/// is kept as is.
pub fn merge_confirmations(local: &[Confirmation], upstream: &[TiSchedule]) -> Vec<Confirmation> {
    if upstream.is_empty() {
        return local.to_vec();
    }

    let mut used = vec![false; local.len()];
    let mut merged: Vec<Confirmation> = upstream
        .iter()
        .map(|schedule| {
            let incoming = confirmation_from_schedule(schedule);
            let existing = local
                .iter()
                .enumerate()
                .find(|(i, c)| !used[*i] && c.key() == incoming.key());

            match existing {
                Some((index, current)) => {
                    used[index] = true;
                    Confirmation {
                        confirmation_number: incoming
                            .confirmation_number
                            .or_else(|| current.confirmation_number.clone()),
                        quantity: incoming.quantity,
                        estimated_ship_date: incoming
                            .estimated_ship_date
                            .or(current.estimated_ship_date),
                        estimated_delivery_date: incoming
                            .estimated_delivery_date
                            .or(current.estimated_delivery_date),
                    }
                }
                None => incoming,
            }
        })
        .collect();

    // Undated schedules sort last; stable sort keeps TI's order for ties
    merged.sort_by_key(|c| (c.estimated_ship_date.is_none(), c.estimated_ship_date));
    merged
}

/// Collapse upstream lines that repeat a part number into one line
fn consolidate_lines(lines: &[TiOrderLine]) -> Result<Vec<TiOrderLine>, DomainError> {
    let mut consolidated: Vec<TiOrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match consolidated
            .iter_mut()
            .find(|l| same_part(&l.ti_part_number, &line.ti_part_number))
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| {
                        DomainError::Validation(format!(
                            "TI quantity for part {} is out of range",
                            line.ti_part_number
                        ))
                    })?;
                existing.schedules.extend(line.schedules.iter().cloned());
                if existing.unit_price.is_none() {
                    existing.unit_price = line.unit_price;
                }
                if existing.status.is_none() {
                    existing.status = line.status.clone();
                }
                if existing.customer_part_number.is_none() {
                    existing.customer_part_number = line.customer_part_number.clone();
                }
            }
            None => consolidated.push(line.clone()),
        }
    }
    Ok(consolidated)
}

/// Resolve the status an order should take after TI reported `upstream`.
///
/// TI does not know about local payment tracking, so invoiced and paid
/// orders are not moved back to a shipping stage. An order that has left
/// draft never returns to it. Cancellation always wins.
pub fn reconcile_status(current: OrderStatus, upstream: OrderStatus) -> OrderStatus {
    if upstream == OrderStatus::Cancelled {
        return OrderStatus::Cancelled;
    }
    if upstream == OrderStatus::Draft && current != OrderStatus::Draft {
        return current;
    }
    if matches!(current, OrderStatus::Invoiced | OrderStatus::Paid)
        && upstream.rank() < current.rank()
    {
        return current;
    }
    upstream
}

/// Merge a TI order into the local order
pub fn merge_order(order: &mut Order, upstream: &TiOrder) -> Result<MergeReport, DomainError> {
    let lines = consolidate_lines(&upstream.line_items)?;
    let mut report = MergeReport {
        retained: order
            .components
            .iter()
            .filter(|c| !lines.iter().any(|l| same_part(&l.ti_part_number, &c.ti_part_number)))
            .count(),
        ..Default::default()
    };

    order.ti_order_number = Some(upstream.order_number.clone());
    if let Some(ref currency) = upstream.currency {
        order.currency = currency.clone();
    }
    if let Some(text) = upstream.order_status.as_deref() {
        match OrderStatus::from_ti(text) {
            Some(status) => order.status = reconcile_status(order.status, status),
            None => tracing::warn!(
                order_id = %order.id,
                ti_status = %text,
                "Unrecognized TI order status, keeping local status"
            ),
        }
    }

    for line in &lines {
        match order.find_component_mut(&line.ti_part_number) {
            Some(component) => {
                component.quantity = line.quantity;
                if let Some(price) = line.unit_price {
                    component.unit_price = Some(price);
                }
                if line.status.is_some() {
                    component.status = line.status.clone();
                }
                if line.customer_part_number.is_some() {
                    component.customer_part_number = line.customer_part_number.clone();
                }
                component.confirmations =
                    merge_confirmations(&component.confirmations, &line.schedules);
                report.matched += 1;
            }
            None => {
                order.components.push(Component {
                    ti_part_number: normalize_part_number(&line.ti_part_number),
                    customer_part_number: line.customer_part_number.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    moq: None,
                    nq: None,
                    status: line.status.clone(),
                    confirmations: merge_confirmations(&[], &line.schedules),
                });
                report.added += 1;
            }
        }
    }

    order.recompute_totals()?;
    let now = Utc::now();
    order.last_synced_at = Some(now);
    order.updated_at = now;
    Ok(report)
}

/// Merge a TI quote into the local quotation
pub fn merge_quote(
    quotation: &mut Quotation,
    upstream: &TiQuote,
) -> Result<MergeReport, DomainError> {
    let mut report = MergeReport {
        retained: quotation
            .components
            .iter()
            .filter(|c| {
                !upstream
                    .line_items
                    .iter()
                    .any(|l| same_part(&l.ti_part_number, &c.ti_part_number))
            })
            .count(),
        ..Default::default()
    };

    quotation.quote_number = Some(upstream.quote_number.clone());
    if let Some(ref currency) = upstream.currency {
        quotation.currency = currency.clone();
    }
    if upstream.expiration_date.is_some() {
        quotation.expiration_date = upstream.expiration_date;
    }
    if let Some(ref text) = upstream.quote_status {
        match QuotationStatus::from_ti(text) {
            // An ordered quote stays ordered even if TI still lists it as active
            Some(status) if quotation.status != QuotationStatus::Ordered => {
                quotation.status = status
            }
            Some(_) => {}
            None => tracing::warn!(
                quotation_id = %quotation.id,
                ti_status = %text,
                "Unrecognized TI quote status, keeping local status"
            ),
        }
    }

    for line in &upstream.line_items {
        let existing = quotation
            .components
            .iter_mut()
            .find(|c| same_part(&c.ti_part_number, &line.ti_part_number));
        match existing {
            Some(component) => {
                component.quantity = line.quantity;
                if let Some(moq) = line.minimum_order_quantity {
                    component.moq = moq.max(1);
                }
                if let Some(nq) = line.order_increment {
                    component.nq = nq.max(1);
                }
                if line.price.is_some() {
                    component.unit_price = line.price;
                }
                if line.customer_part_number.is_some() {
                    component.customer_part_number = line.customer_part_number.clone();
                }
                report.matched += 1;
            }
            None => {
                quotation.components.push(QuoteComponent {
                    ti_part_number: normalize_part_number(&line.ti_part_number),
                    customer_part_number: line.customer_part_number.clone(),
                    quantity: line.quantity,
                    moq: line.minimum_order_quantity.unwrap_or(1).max(1),
                    nq: line.order_increment.unwrap_or(1).max(1),
                    unit_price: line.price,
                });
                report.added += 1;
            }
        }
    }

    quotation.recompute_totals()?;
    quotation.touch();
    Ok(report)
}

/// Merge shipments from an ASN; returns the number of new shipments
pub fn merge_shipments(order: &mut Order, asn: &TiAsn) -> usize {
    let mut added = 0;
    for incoming in &asn.shipments {
        let shipment = Shipment {
            shipment_id: incoming.shipment_number.clone(),
            carrier: incoming.carrier.clone(),
            tracking_number: incoming.tracking_number.clone(),
            ship_date: incoming.ship_date,
            items: incoming
                .line_items
                .iter()
                .map(|l| ShipmentItem {
                    ti_part_number: normalize_part_number(&l.ti_part_number),
                    quantity: l.shipped_quantity,
                })
                .collect(),
        };

        match order
            .shipments
            .iter_mut()
            .find(|s| s.shipment_id == shipment.shipment_id)
        {
            Some(existing) => *existing = shipment,
            None => {
                order.shipments.push(shipment);
                added += 1;
            }
        }
    }
    order.shipments.sort_by_key(|s| (s.ship_date.is_none(), s.ship_date));
    added
}

/// Shipping stage implied by the order's shipments, if any
pub fn shipping_status(order: &Order) -> Option<OrderStatus> {
    if order.components.is_empty() || order.shipments.is_empty() {
        return None;
    }

    let mut any_shipped = false;
    let mut all_shipped = true;
    for component in &order.components {
        let shipped = order.shipped_quantity(&component.ti_part_number);
        if shipped > 0 {
            any_shipped = true;
        }
        if shipped < component.quantity {
            all_shipped = false;
        }
    }

    if all_shipped {
        Some(OrderStatus::Shipped)
    } else if any_shipped {
        Some(OrderStatus::PartiallyShipped)
    } else {
        None
    }
}

/// Move the order forward to the stage its shipments imply.
///
/// Returns whether the status changed. Never moves backwards and never
/// touches cancelled orders.
pub fn apply_shipping_progress(order: &mut Order) -> bool {
    if order.status == OrderStatus::Cancelled {
        return false;
    }
    match shipping_status(order) {
        Some(status) if status.rank() > order.status.rank() => {
            order.status = status;
            true
        }
        _ => false,
    }
}

/// Merge TI invoices; returns the number of new invoices.
///
/// Locally recorded payments are preserved. A shipped order with at least
/// one invoice becomes invoiced.
pub fn merge_invoices(order: &mut Order, invoices: &[TiInvoice]) -> usize {
    let mut added = 0;
    for incoming in invoices {
        match order.find_invoice_mut(&incoming.invoice_number) {
            Some(existing) => {
                existing.invoice_date = incoming.invoice_date.or(existing.invoice_date);
                existing.due_date = incoming.due_date.or(existing.due_date);
                existing.currency = incoming.currency.clone();
                existing.amount = incoming.total_amount;
            }
            None => {
                order.invoices.push(Invoice {
                    invoice_number: incoming.invoice_number.clone(),
                    invoice_date: incoming.invoice_date,
                    due_date: incoming.due_date,
                    currency: incoming.currency.clone(),
                    amount: incoming.total_amount,
                    paid_amount: Default::default(),
                });
                added += 1;
            }
        }
    }

    if order.status == OrderStatus::Shipped && !order.invoices.is_empty() {
        order.status = OrderStatus::Invoiced;
    }
    if order.status == OrderStatus::Invoiced && order.all_invoices_settled() {
        order.status = OrderStatus::Paid;
    }
    added
}

/// Record a payment against one of the order's invoices.
///
/// Returns false when the order has no such invoice. An order whose invoices
/// are all settled becomes paid.
pub fn settle_payment(
    order: &mut Order,
    invoice_number: &str,
    amount: rust_decimal::Decimal,
) -> bool {
    let Some(invoice) = order.find_invoice_mut(invoice_number) else {
        return false;
    };
    invoice.paid_amount += amount;

    if order.status != OrderStatus::Cancelled && order.all_invoices_settled() {
        order.status = OrderStatus::Paid;
    }
    true
}
