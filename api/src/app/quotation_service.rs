//! Quotation service
//!
//! Quote requests against TI and conversion of active quotes into orders.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::app::reconcile::merge_quote;
use crate::domain::entities::{
    ComponentUpdate, NewOrder, NewQuotation, Order, Quotation, QuotationId, QuotationStatus,
    QuotationUpdate, QuoteComponent,
};
use crate::domain::ports::{
    OrderRepository, QuotationRepository, TiClient, TiQuote, TiQuoteRequest, TiQuoteRequestLine,
};
use crate::error::{AppError, DomainError};

use super::order_service::MAX_PAGE_SIZE;

/// Order details supplied when converting a quotation
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertQuotation {
    pub customer_purchase_order_number: String,
    #[serde(default)]
    pub ship_to: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Service for managing quotations
pub struct QuotationService<QR, OR, TC>
where
    QR: QuotationRepository,
    OR: OrderRepository,
    TC: TiClient,
{
    quotations: Arc<QR>,
    orders: Arc<OR>,
    ti: Arc<TC>,
    default_currency: String,
}

impl<QR, OR, TC> QuotationService<QR, OR, TC>
where
    QR: QuotationRepository,
    OR: OrderRepository,
    TC: TiClient,
{
    pub fn new(quotations: Arc<QR>, orders: Arc<OR>, ti: Arc<TC>, default_currency: String) -> Self {
        Self {
            quotations,
            orders,
            ti,
            default_currency,
        }
    }

    async fn load(&self, id: &QuotationId) -> Result<Quotation, DomainError> {
        self.quotations
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Quotation {} not found", id)))
    }

    pub async fn create(&self, new_quotation: NewQuotation) -> Result<Quotation, DomainError> {
        new_quotation.validate()?;
        let quotation = self
            .quotations
            .create(&new_quotation, &self.default_currency)
            .await?;
        tracing::info!(quotation_id = %quotation.id, reference = %quotation.reference, "Quotation created");
        Ok(quotation)
    }

    pub async fn get(&self, id: &QuotationId) -> Result<Quotation, DomainError> {
        self.load(id).await
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Quotation>, DomainError> {
        self.quotations
            .list(limit.clamp(1, MAX_PAGE_SIZE), offset.max(0))
            .await
    }

    pub async fn update(
        &self,
        id: &QuotationId,
        update: QuotationUpdate,
    ) -> Result<Quotation, DomainError> {
        let mut quotation = self.load(id).await?;

        if let Some(reference) = update.reference {
            if reference.trim().is_empty() {
                return Err(DomainError::Validation("reference is required".to_string()));
            }
            quotation.reference = reference;
        }
        if let Some(currency) = update.currency {
            // the currency is fixed once TI has priced the quote
            quotation.ensure_components_editable()?;
            quotation.currency = currency;
        }

        quotation.touch();
        self.quotations.save(&quotation).await
    }

    pub async fn delete(&self, id: &QuotationId) -> Result<(), DomainError> {
        let quotation = self.load(id).await?;
        if quotation.status == QuotationStatus::Ordered {
            return Err(DomainError::Conflict(format!(
                "quotation {} has already been ordered",
                id
            )));
        }
        self.quotations.delete(id).await?;
        tracing::info!(quotation_id = %id, "Quotation deleted");
        Ok(())
    }

    pub async fn add_component(
        &self,
        id: &QuotationId,
        component: QuoteComponent,
    ) -> Result<Quotation, DomainError> {
        let mut quotation = self.load(id).await?;
        quotation.add_component(component)?;
        quotation.touch();
        self.quotations.save(&quotation).await
    }

    pub async fn update_component(
        &self,
        id: &QuotationId,
        part_number: &str,
        update: ComponentUpdate,
    ) -> Result<Quotation, DomainError> {
        let mut quotation = self.load(id).await?;
        quotation.update_component(part_number, &update)?;
        quotation.touch();
        self.quotations.save(&quotation).await
    }

    pub async fn remove_component(
        &self,
        id: &QuotationId,
        part_number: &str,
    ) -> Result<Quotation, DomainError> {
        let mut quotation = self.load(id).await?;
        quotation.remove_component(part_number)?;
        quotation.touch();
        self.quotations.save(&quotation).await
    }

    /// Request pricing for a draft quotation from TI
    pub async fn submit(&self, id: &QuotationId) -> Result<Quotation, AppError> {
        let mut quotation = self.load(id).await?;
        if quotation.status != QuotationStatus::Draft {
            return Err(DomainError::Conflict(format!(
                "quotation {} is {}; only drafts can be submitted",
                id, quotation.status
            ))
            .into());
        }
        if quotation.components.is_empty() {
            return Err(
                DomainError::Validation(format!("quotation {} has no line items", id)).into(),
            );
        }

        let request = TiQuoteRequest {
            customer_reference: quotation.reference.clone(),
            currency: quotation.currency.clone(),
            line_items: quotation
                .components
                .iter()
                .map(|c| TiQuoteRequestLine {
                    ti_part_number: c.ti_part_number.clone(),
                    customer_part_number: c.customer_part_number.clone(),
                    quantity: c.quantity,
                })
                .collect(),
        };

        let upstream = self.ti.create_quote(&request).await?;
        let report = merge_quote(&mut quotation, &upstream)?;
        if quotation.status == QuotationStatus::Draft {
            quotation.status = QuotationStatus::Requested;
        }

        tracing::info!(
            quotation_id = %quotation.id,
            quote_number = %upstream.quote_number,
            status = %quotation.status,
            matched = report.matched,
            "Quote requested from TI"
        );
        Ok(self.quotations.save(&quotation).await?)
    }

    /// Pull the TI view of a requested quote and reconcile
    pub async fn sync(&self, id: &QuotationId) -> Result<Quotation, AppError> {
        let mut quotation = self.load(id).await?;
        let number = quotation.quote_number.clone().ok_or_else(|| {
            DomainError::Conflict(format!("quotation {} has not been submitted to TI", id))
        })?;

        let upstream = self.ti.get_quote(&number).await?;
        let report = merge_quote(&mut quotation, &upstream)?;
        tracing::info!(
            quotation_id = %quotation.id,
            quote_number = %number,
            status = %quotation.status,
            matched = report.matched,
            added = report.added,
            "Quotation synced from TI"
        );
        Ok(self.quotations.save(&quotation).await?)
    }

    /// Reconcile a quote pushed by TI; `None` when no local quotation matches
    pub async fn apply_upstream_quote(
        &self,
        upstream: &TiQuote,
    ) -> Result<Option<Quotation>, DomainError> {
        let Some(mut quotation) = self
            .quotations
            .find_by_quote_number(&upstream.quote_number)
            .await?
        else {
            tracing::warn!(quote_number = %upstream.quote_number, "Pushed quote matches no local quotation");
            return Ok(None);
        };

        merge_quote(&mut quotation, upstream)?;
        tracing::info!(
            quotation_id = %quotation.id,
            quote_number = %upstream.quote_number,
            status = %quotation.status,
            "Applied pushed quote update"
        );
        self.quotations.save(&quotation).await.map(Some)
    }

    /// Create a draft order from an active quotation
    pub async fn convert_to_order(
        &self,
        id: &QuotationId,
        request: ConvertQuotation,
    ) -> Result<Order, DomainError> {
        let mut quotation = self.load(id).await?;
        quotation.ensure_orderable(Utc::now().date_naive())?;

        let new_order = NewOrder {
            customer_purchase_order_number: request.customer_purchase_order_number,
            currency: Some(quotation.currency.clone()),
            ship_to: request.ship_to,
            notes: request.notes,
            quotation_number: quotation.quote_number.clone(),
            components: quotation
                .components
                .iter()
                .map(QuoteComponent::to_component)
                .collect(),
        };
        new_order.validate()?;
        if self
            .orders
            .find_by_purchase_order_number(&new_order.customer_purchase_order_number)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyExists(format!(
                "purchase order {} is already in use",
                new_order.customer_purchase_order_number
            )));
        }

        let order = self.orders.create(&new_order, &self.default_currency).await?;

        quotation.status = QuotationStatus::Ordered;
        quotation.touch();
        self.quotations.save(&quotation).await?;

        tracing::info!(
            quotation_id = %quotation.id,
            order_id = %order.id,
            "Quotation converted to order"
        );
        Ok(order)
    }
}
