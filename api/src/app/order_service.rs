//! Order service
//!
//! Local order editing, submission to TI and reconciliation of order status,
//! confirmations, shipments and invoices reported by TI.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::app::reconcile::{
    apply_shipping_progress, merge_invoices, merge_order, merge_shipments,
};
use crate::domain::entities::{
    validate_purchase_order_number, Component, ComponentUpdate, NewOrder, Order, OrderFilter,
    OrderId, OrderStatus, OrderUpdate,
};
use crate::domain::ports::{
    OrderRepository, TiAsn, TiClient, TiOrder, TiOrderRequest, TiOrderRequestLine,
};
use crate::error::{AppError, DomainError};

pub const MAX_PAGE_SIZE: i64 = 100;

/// Outcome of a bulk logistics refresh
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogisticsRefreshSummary {
    pub attempted: usize,
    pub refreshed: usize,
    pub failed: Vec<OrderId>,
}

/// Service for managing orders
pub struct OrderService<OR, TC>
where
    OR: OrderRepository,
    TC: TiClient,
{
    orders: Arc<OR>,
    ti: Arc<TC>,
    default_currency: String,
    checkout_profile_id: Option<String>,
    refresh_concurrency: usize,
}

impl<OR, TC> OrderService<OR, TC>
where
    OR: OrderRepository,
    TC: TiClient,
{
    pub fn new(orders: Arc<OR>, ti: Arc<TC>, default_currency: String) -> Self {
        Self {
            orders,
            ti,
            default_currency,
            checkout_profile_id: None,
            refresh_concurrency: 8,
        }
    }

    pub fn with_checkout_profile(mut self, profile_id: Option<String>) -> Self {
        self.checkout_profile_id = profile_id;
        self
    }

    pub fn with_refresh_concurrency(mut self, concurrency: usize) -> Self {
        self.refresh_concurrency = concurrency.max(1);
        self
    }

    async fn load(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Order {} not found", id)))
    }

    async fn ensure_unique_po(&self, po: &str, except: Option<&OrderId>) -> Result<(), DomainError> {
        if let Some(existing) = self.orders.find_by_purchase_order_number(po).await? {
            if Some(&existing.id) != except {
                return Err(DomainError::AlreadyExists(format!(
                    "purchase order {} is already used by order {}",
                    po, existing.id
                )));
            }
        }
        Ok(())
    }

    /// Create a draft order
    pub async fn create(&self, new_order: NewOrder) -> Result<Order, DomainError> {
        new_order.validate()?;
        self.ensure_unique_po(&new_order.customer_purchase_order_number, None)
            .await?;

        let order = self
            .orders
            .create(&new_order, &self.default_currency)
            .await?;
        tracing::info!(order_id = %order.id, po = %order.customer_purchase_order_number, "Order created");
        Ok(order)
    }

    pub async fn get(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.load(id).await
    }

    pub async fn list(
        &self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, DomainError> {
        self.orders
            .list(filter, limit.clamp(1, MAX_PAGE_SIZE), offset.max(0))
            .await
    }

    /// Apply a partial update to the order header
    pub async fn update(&self, id: &OrderId, update: OrderUpdate) -> Result<Order, DomainError> {
        let mut order = self.load(id).await?;
        order.ensure_editable()?;

        if let Some(po) = update.customer_purchase_order_number {
            validate_purchase_order_number(&po)?;
            if order.ti_order_number.is_some() && po != order.customer_purchase_order_number {
                return Err(DomainError::Conflict(format!(
                    "order {} was already submitted under purchase order {}",
                    id, order.customer_purchase_order_number
                )));
            }
            self.ensure_unique_po(&po, Some(id)).await?;
            order.customer_purchase_order_number = po;
        }
        if let Some(currency) = update.currency {
            order.currency = currency;
        }
        if update.ship_to.is_some() {
            order.ship_to = update.ship_to;
        }
        if update.notes.is_some() {
            order.notes = update.notes;
        }
        if let Some(status) = update.status {
            if status != OrderStatus::Cancelled {
                return Err(DomainError::Validation(
                    "status can only be changed to cancelled; other transitions come from TI"
                        .to_string(),
                ));
            }
            if order.status.rank() > OrderStatus::Confirmed.rank() {
                return Err(DomainError::Conflict(format!(
                    "order {} is {} and can no longer be cancelled",
                    id, order.status
                )));
            }
            order.status = OrderStatus::Cancelled;
        }

        order.touch();
        self.orders.save(&order).await
    }

    /// Delete a draft or cancelled order
    pub async fn delete(&self, id: &OrderId) -> Result<(), DomainError> {
        let order = self.load(id).await?;
        if !matches!(order.status, OrderStatus::Draft | OrderStatus::Cancelled) {
            return Err(DomainError::Conflict(format!(
                "order {} is {}; only drafts and cancelled orders can be deleted",
                id, order.status
            )));
        }
        self.orders.delete(id).await?;
        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }

    pub async fn add_component(
        &self,
        id: &OrderId,
        component: Component,
    ) -> Result<Order, DomainError> {
        let mut order = self.load(id).await?;
        order.add_component(component)?;
        order.touch();
        self.orders.save(&order).await
    }

    pub async fn update_component(
        &self,
        id: &OrderId,
        part_number: &str,
        update: ComponentUpdate,
    ) -> Result<Order, DomainError> {
        let mut order = self.load(id).await?;
        order.update_component(part_number, &update)?;
        order.touch();
        self.orders.save(&order).await
    }

    pub async fn remove_component(
        &self,
        id: &OrderId,
        part_number: &str,
    ) -> Result<Order, DomainError> {
        let mut order = self.load(id).await?;
        order.remove_component(part_number)?;
        order.touch();
        self.orders.save(&order).await
    }

    /// Place a draft order with TI
    pub async fn submit(&self, id: &OrderId) -> Result<Order, AppError> {
        let mut order = self.load(id).await?;
        if order.status != OrderStatus::Draft {
            return Err(DomainError::Conflict(format!(
                "order {} is {}; only drafts can be submitted",
                id, order.status
            ))
            .into());
        }
        if order.components.is_empty() {
            return Err(DomainError::Validation(format!("order {} has no line items", id)).into());
        }

        let request = TiOrderRequest {
            customer_purchase_order_number: order.customer_purchase_order_number.clone(),
            quote_number: order.quotation_number.clone(),
            checkout_profile_id: self.checkout_profile_id.clone(),
            ship_to: order.ship_to.clone(),
            line_items: order
                .components
                .iter()
                .map(|c| TiOrderRequestLine {
                    ti_part_number: c.ti_part_number.clone(),
                    customer_part_number: c.customer_part_number.clone(),
                    quantity: c.quantity,
                })
                .collect(),
        };

        let upstream = self.ti.create_order(&request).await?;
        let report = merge_order(&mut order, &upstream)?;
        if order.status == OrderStatus::Draft {
            order.status = OrderStatus::Submitted;
        }

        tracing::info!(
            order_id = %order.id,
            ti_order_number = %upstream.order_number,
            matched = report.matched,
            added = report.added,
            "Order submitted to TI"
        );
        Ok(self.orders.save(&order).await?)
    }

    /// Pull the TI view of a submitted order and reconcile
    pub async fn sync(&self, id: &OrderId) -> Result<Order, AppError> {
        let mut order = self.load(id).await?;
        let number = submitted_number(&order)?;

        let upstream = self.ti.get_order(&number).await?;
        let report = merge_order(&mut order, &upstream)?;
        tracing::info!(
            order_id = %order.id,
            ti_order_number = %number,
            status = %order.status,
            matched = report.matched,
            added = report.added,
            retained = report.retained,
            "Order synced from TI"
        );
        Ok(self.orders.save(&order).await?)
    }

    async fn refresh_order_logistics(&self, mut order: Order) -> Result<Order, AppError> {
        let number = submitted_number(&order)?;
        let asn = self.ti.get_asn(&number).await?;

        let added = merge_shipments(&mut order, &asn);
        let advanced = apply_shipping_progress(&mut order);
        order.last_synced_at = Some(chrono::Utc::now());
        order.touch();

        tracing::debug!(
            order_id = %order.id,
            ti_order_number = %number,
            new_shipments = added,
            status_changed = advanced,
            "Logistics refreshed"
        );
        Ok(self.orders.save(&order).await?)
    }

    /// Pull shipment notices for one order
    pub async fn refresh_logistics(&self, id: &OrderId) -> Result<Order, AppError> {
        let order = self.load(id).await?;
        self.refresh_order_logistics(order).await
    }

    /// Pull shipment notices for every order still in transit.
    ///
    /// Orders are refreshed concurrently; a failing order is logged and
    /// skipped without affecting the others.
    pub async fn refresh_all_logistics(&self) -> Result<LogisticsRefreshSummary, DomainError> {
        let orders = self
            .orders
            .find_submitted_with_status(&[
                OrderStatus::Submitted,
                OrderStatus::Confirmed,
                OrderStatus::PartiallyShipped,
            ])
            .await?;

        let mut summary = LogisticsRefreshSummary {
            attempted: orders.len(),
            ..Default::default()
        };

        let results: Vec<(OrderId, Result<Order, AppError>)> = stream::iter(orders)
            .map(|order| async move {
                let id = order.id;
                (id, self.refresh_order_logistics(order).await)
            })
            .buffer_unordered(self.refresh_concurrency)
            .collect()
            .await;

        for (id, result) in results {
            match result {
                Ok(_) => summary.refreshed += 1,
                Err(e) => {
                    tracing::warn!(order_id = %id, error = %e, "Skipping order after failed logistics refresh");
                    summary.failed.push(id);
                }
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            refreshed = summary.refreshed,
            failed = summary.failed.len(),
            "Bulk logistics refresh finished"
        );
        Ok(summary)
    }

    /// Pull invoices for one order
    pub async fn refresh_invoices(&self, id: &OrderId) -> Result<Order, AppError> {
        let mut order = self.load(id).await?;
        let number = submitted_number(&order)?;

        let invoices = self.ti.get_invoices(&number).await?;
        let added = merge_invoices(&mut order, &invoices);
        order.touch();

        tracing::info!(
            order_id = %order.id,
            ti_order_number = %number,
            new_invoices = added,
            status = %order.status,
            "Invoices refreshed"
        );
        Ok(self.orders.save(&order).await?)
    }

    async fn locate(
        &self,
        order_number: &str,
        purchase_order: Option<&str>,
    ) -> Result<Option<Order>, DomainError> {
        if let Some(order) = self.orders.find_by_ti_order_number(order_number).await? {
            return Ok(Some(order));
        }
        match purchase_order {
            Some(po) => self.orders.find_by_purchase_order_number(po).await,
            None => Ok(None),
        }
    }

    /// Reconcile an order pushed by TI; `None` when no local order matches
    pub async fn apply_upstream_order(&self, upstream: &TiOrder) -> Result<Option<Order>, DomainError> {
        let Some(mut order) = self
            .locate(
                &upstream.order_number,
                upstream.customer_purchase_order_number.as_deref(),
            )
            .await?
        else {
            tracing::warn!(ti_order_number = %upstream.order_number, "Pushed order matches no local order");
            return Ok(None);
        };

        let report = merge_order(&mut order, upstream)?;
        if order.status == OrderStatus::Draft {
            order.status = OrderStatus::Submitted;
        }
        tracing::info!(
            order_id = %order.id,
            ti_order_number = %upstream.order_number,
            status = %order.status,
            matched = report.matched,
            added = report.added,
            "Applied pushed order update"
        );
        self.orders.save(&order).await.map(Some)
    }

    /// Reconcile a shipment notice pushed by TI
    pub async fn apply_upstream_asn(&self, asn: &TiAsn) -> Result<Option<Order>, DomainError> {
        let Some(mut order) = self
            .locate(&asn.order_number, asn.customer_purchase_order_number.as_deref())
            .await?
        else {
            tracing::warn!(ti_order_number = %asn.order_number, "Pushed ASN matches no local order");
            return Ok(None);
        };

        if order.ti_order_number.is_none() {
            order.ti_order_number = Some(asn.order_number.clone());
        }
        let added = merge_shipments(&mut order, asn);
        apply_shipping_progress(&mut order);
        order.last_synced_at = Some(chrono::Utc::now());
        order.touch();

        tracing::info!(
            order_id = %order.id,
            ti_order_number = %asn.order_number,
            new_shipments = added,
            status = %order.status,
            "Applied pushed shipment notice"
        );
        self.orders.save(&order).await.map(Some)
    }
}

fn submitted_number(order: &Order) -> Result<String, DomainError> {
    order.ti_order_number.clone().ok_or_else(|| {
        DomainError::Conflict(format!("order {} has not been submitted to TI", order.id))
    })
}
