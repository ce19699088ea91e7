//! Remittance service
//!
//! Builds remittance notifications, sends them to TI and records the
//! payments against the invoices of local orders.

use std::sync::Arc;

use crate::app::reconcile::settle_payment;
use crate::domain::entities::{
    NewRemittance, RemittanceId, RemittanceItem, RemittanceItemUpdate, RemittanceNotification,
    RemittanceStatus, RemittanceUpdate,
};
use crate::domain::ports::{
    OrderRepository, RemittanceRepository, TiClient, TiRemittanceLine, TiRemittanceRequest,
};
use crate::error::{AppError, DomainError};

use super::order_service::MAX_PAGE_SIZE;

/// Service for managing remittance notifications
pub struct RemittanceService<RR, OR, TC>
where
    RR: RemittanceRepository,
    OR: OrderRepository,
    TC: TiClient,
{
    remittances: Arc<RR>,
    orders: Arc<OR>,
    ti: Arc<TC>,
    default_currency: String,
}

impl<RR, OR, TC> RemittanceService<RR, OR, TC>
where
    RR: RemittanceRepository,
    OR: OrderRepository,
    TC: TiClient,
{
    pub fn new(remittances: Arc<RR>, orders: Arc<OR>, ti: Arc<TC>, default_currency: String) -> Self {
        Self {
            remittances,
            orders,
            ti,
            default_currency,
        }
    }

    async fn load(&self, id: &RemittanceId) -> Result<RemittanceNotification, DomainError> {
        self.remittances
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Remittance {} not found", id)))
    }

    pub async fn create(
        &self,
        new_remittance: NewRemittance,
    ) -> Result<RemittanceNotification, DomainError> {
        new_remittance.validate()?;
        let remittance = self
            .remittances
            .create(&new_remittance, &self.default_currency)
            .await?;
        tracing::info!(remittance_id = %remittance.id, reference = %remittance.reference, "Remittance created");
        Ok(remittance)
    }

    pub async fn get(&self, id: &RemittanceId) -> Result<RemittanceNotification, DomainError> {
        self.load(id).await
    }

    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RemittanceNotification>, DomainError> {
        self.remittances
            .list(limit.clamp(1, MAX_PAGE_SIZE), offset.max(0))
            .await
    }

    pub async fn update(
        &self,
        id: &RemittanceId,
        update: RemittanceUpdate,
    ) -> Result<RemittanceNotification, DomainError> {
        let mut remittance = self.load(id).await?;
        remittance.ensure_draft()?;

        if let Some(reference) = update.reference {
            if reference.trim().is_empty() {
                return Err(DomainError::Validation("reference is required".to_string()));
            }
            remittance.reference = reference;
        }
        if let Some(date) = update.payment_date {
            remittance.payment_date = date;
        }
        if let Some(currency) = update.currency {
            remittance.currency = currency;
        }
        if update.payment_method.is_some() {
            remittance.payment_method = update.payment_method;
        }

        remittance.touch();
        self.remittances.save(&remittance).await
    }

    pub async fn delete(&self, id: &RemittanceId) -> Result<(), DomainError> {
        let remittance = self.load(id).await?;
        remittance.ensure_draft()?;
        self.remittances.delete(id).await?;
        tracing::info!(remittance_id = %id, "Remittance deleted");
        Ok(())
    }

    pub async fn add_item(
        &self,
        id: &RemittanceId,
        item: RemittanceItem,
    ) -> Result<RemittanceNotification, DomainError> {
        let mut remittance = self.load(id).await?;
        remittance.add_item(item)?;
        remittance.touch();
        self.remittances.save(&remittance).await
    }

    pub async fn update_item(
        &self,
        id: &RemittanceId,
        invoice_number: &str,
        update: RemittanceItemUpdate,
    ) -> Result<RemittanceNotification, DomainError> {
        let mut remittance = self.load(id).await?;
        remittance.update_item(invoice_number, &update)?;
        remittance.touch();
        self.remittances.save(&remittance).await
    }

    pub async fn remove_item(
        &self,
        id: &RemittanceId,
        invoice_number: &str,
    ) -> Result<RemittanceNotification, DomainError> {
        let mut remittance = self.load(id).await?;
        remittance.remove_item(invoice_number)?;
        remittance.touch();
        self.remittances.save(&remittance).await
    }

    /// Notify TI of the payment, then record it against local invoices
    pub async fn submit(&self, id: &RemittanceId) -> Result<RemittanceNotification, AppError> {
        let mut remittance = self.load(id).await?;
        remittance.ensure_draft()?;
        if remittance.items.is_empty() {
            return Err(
                DomainError::Validation(format!("remittance {} has no items", id)).into(),
            );
        }

        let request = TiRemittanceRequest {
            remittance_reference: remittance.reference.clone(),
            payment_date: remittance.payment_date,
            currency: remittance.currency.clone(),
            payment_method: remittance.payment_method.clone(),
            total_amount: remittance.total_amount,
            line_items: remittance
                .items
                .iter()
                .map(|i| TiRemittanceLine {
                    invoice_number: i.invoice_number.clone(),
                    amount_paid: i.amount,
                })
                .collect(),
        };

        let ack = self.ti.submit_remittance(&request).await?;
        remittance.ti_reference = Some(ack.remittance_id.clone());
        remittance.status = RemittanceStatus::Submitted;
        remittance.touch();
        let saved = self.remittances.save(&remittance).await?;

        tracing::info!(
            remittance_id = %saved.id,
            ti_reference = %ack.remittance_id,
            total = %saved.total_amount,
            "Remittance submitted to TI"
        );

        let settled = self.settle(&saved).await;
        tracing::debug!(remittance_id = %saved.id, settled, "Invoice settlement finished");
        Ok(saved)
    }

    /// Apply each item to its order's invoice; returns the number applied
    async fn settle(&self, remittance: &RemittanceNotification) -> usize {
        let mut settled = 0;
        for item in &remittance.items {
            let Some(ref order_number) = item.order_number else {
                continue;
            };
            match self.settle_item(order_number, item).await {
                Ok(true) => settled += 1,
                Ok(false) => tracing::warn!(
                    remittance_id = %remittance.id,
                    ti_order_number = %order_number,
                    invoice_number = %item.invoice_number,
                    "No local invoice to settle"
                ),
                Err(e) => tracing::warn!(
                    remittance_id = %remittance.id,
                    ti_order_number = %order_number,
                    invoice_number = %item.invoice_number,
                    error = %e,
                    "Failed to settle invoice"
                ),
            }
        }
        settled
    }

    async fn settle_item(
        &self,
        order_number: &str,
        item: &RemittanceItem,
    ) -> Result<bool, DomainError> {
        let Some(mut order) = self.orders.find_by_ti_order_number(order_number).await? else {
            return Ok(false);
        };
        if !settle_payment(&mut order, &item.invoice_number, item.amount) {
            return Ok(false);
        }
        order.touch();
        self.orders.save(&order).await?;
        Ok(true)
    }
}
