//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    NewOrder, NewQuotation, NewRemittance, Order, OrderFilter, OrderId, OrderStatus, Quotation,
    QuotationId, RemittanceId, RemittanceNotification,
};
use crate::domain::ports::{
    OrderRepository, QuotationRepository, RemittanceRepository, TiAsn, TiClient, TiInvoice,
    TiOrder, TiOrderLine, TiOrderRequest, TiQuote, TiQuoteLine, TiQuoteRequest, TiRemittanceAck,
    TiRemittanceRequest,
};
use crate::error::{DomainError, TiError};

fn page<T>(mut items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = offset.max(0) as usize;
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    items.truncate(limit.max(0) as usize);
    items
}

// ============================================================================
// In-Memory Order Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an order for testing
    pub fn with_order(self, order: Order) -> Self {
        self.orders.write().unwrap().insert(order.id, order);
        self
    }

    /// Read the stored document directly
    pub fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders.read().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.get(id))
    }

    async fn find_by_ti_order_number(&self, number: &str) -> Result<Option<Order>, DomainError> {
        let orders = self.orders.read().unwrap();
        Ok(orders
            .values()
            .find(|o| o.ti_order_number.as_deref() == Some(number))
            .cloned())
    }

    async fn find_by_purchase_order_number(
        &self,
        po: &str,
    ) -> Result<Option<Order>, DomainError> {
        let orders = self.orders.read().unwrap();
        Ok(orders
            .values()
            .find(|o| o.customer_purchase_order_number == po)
            .cloned())
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, DomainError> {
        let orders = self.orders.read().unwrap();
        let mut matching: Vec<_> = orders
            .values()
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(matching, limit, offset))
    }

    async fn find_submitted_with_status(
        &self,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, DomainError> {
        let orders = self.orders.read().unwrap();
        Ok(orders
            .values()
            .filter(|o| o.ti_order_number.is_some() && statuses.contains(&o.status))
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        new_order: &NewOrder,
        default_currency: &str,
    ) -> Result<Order, DomainError> {
        let order = new_order
            .clone()
            .into_order(OrderId::new(), default_currency)?;
        self.orders.write().unwrap().insert(order.id, order.clone());
        Ok(order)
    }

    async fn save(&self, order: &Order) -> Result<Order, DomainError> {
        let mut orders = self.orders.write().unwrap();
        if !orders.contains_key(&order.id) {
            return Err(DomainError::NotFound(format!("Order {} not found", order.id)));
        }
        orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn delete(&self, id: &OrderId) -> Result<(), DomainError> {
        self.orders
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Order {} not found", id)))
    }
}

// ============================================================================
// In-Memory Quotation Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryQuotationRepository {
    quotations: Arc<RwLock<HashMap<QuotationId, Quotation>>>,
}

impl InMemoryQuotationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &QuotationId) -> Option<Quotation> {
        self.quotations.read().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl QuotationRepository for InMemoryQuotationRepository {
    async fn find_by_id(&self, id: &QuotationId) -> Result<Option<Quotation>, DomainError> {
        Ok(self.get(id))
    }

    async fn find_by_quote_number(
        &self,
        number: &str,
    ) -> Result<Option<Quotation>, DomainError> {
        let quotations = self.quotations.read().unwrap();
        Ok(quotations
            .values()
            .find(|q| q.quote_number.as_deref() == Some(number))
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Quotation>, DomainError> {
        let quotations = self.quotations.read().unwrap();
        let mut all: Vec<_> = quotations.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(all, limit, offset))
    }

    async fn create(
        &self,
        new_quotation: &NewQuotation,
        default_currency: &str,
    ) -> Result<Quotation, DomainError> {
        let quotation = new_quotation
            .clone()
            .into_quotation(QuotationId::new(), default_currency)?;
        self.quotations
            .write()
            .unwrap()
            .insert(quotation.id, quotation.clone());
        Ok(quotation)
    }

    async fn save(&self, quotation: &Quotation) -> Result<Quotation, DomainError> {
        let mut quotations = self.quotations.write().unwrap();
        if !quotations.contains_key(&quotation.id) {
            return Err(DomainError::NotFound(format!(
                "Quotation {} not found",
                quotation.id
            )));
        }
        quotations.insert(quotation.id, quotation.clone());
        Ok(quotation.clone())
    }

    async fn delete(&self, id: &QuotationId) -> Result<(), DomainError> {
        self.quotations
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Quotation {} not found", id)))
    }
}

// ============================================================================
// In-Memory Remittance Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryRemittanceRepository {
    remittances: Arc<RwLock<HashMap<RemittanceId, RemittanceNotification>>>,
}

impl InMemoryRemittanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &RemittanceId) -> Option<RemittanceNotification> {
        self.remittances.read().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl RemittanceRepository for InMemoryRemittanceRepository {
    async fn find_by_id(
        &self,
        id: &RemittanceId,
    ) -> Result<Option<RemittanceNotification>, DomainError> {
        Ok(self.get(id))
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RemittanceNotification>, DomainError> {
        let remittances = self.remittances.read().unwrap();
        let mut all: Vec<_> = remittances.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(all, limit, offset))
    }

    async fn create(
        &self,
        new_remittance: &NewRemittance,
        default_currency: &str,
    ) -> Result<RemittanceNotification, DomainError> {
        let remittance = new_remittance
            .clone()
            .into_remittance(RemittanceId::new(), default_currency)?;
        self.remittances
            .write()
            .unwrap()
            .insert(remittance.id, remittance.clone());
        Ok(remittance)
    }

    async fn save(
        &self,
        remittance: &RemittanceNotification,
    ) -> Result<RemittanceNotification, DomainError> {
        let mut remittances = self.remittances.write().unwrap();
        if !remittances.contains_key(&remittance.id) {
            return Err(DomainError::NotFound(format!(
                "Remittance {} not found",
                remittance.id
            )));
        }
        remittances.insert(remittance.id, remittance.clone());
        Ok(remittance.clone())
    }

    async fn delete(&self, id: &RemittanceId) -> Result<(), DomainError> {
        self.remittances
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Remittance {} not found", id)))
    }
}

// ============================================================================
// Mock TI Client
// ============================================================================

/// A mock TI client that tracks calls and returns configurable responses.
///
/// Submitted orders and quotes are remembered under generated numbers so a
/// later `get_*` call sees them. Quotes come back priced at 0.40 with an MOQ
/// and increment of 250.
#[derive(Default)]
pub struct MockTiClient {
    pub should_fail: Arc<RwLock<bool>>,
    sequence: AtomicU64,
    orders: Arc<RwLock<HashMap<String, TiOrder>>>,
    quotes: Arc<RwLock<HashMap<String, TiQuote>>>,
    asns: Arc<RwLock<HashMap<String, TiAsn>>>,
    invoices: Arc<RwLock<HashMap<String, Vec<TiInvoice>>>>,
    failing_asns: Arc<RwLock<HashSet<String>>>,
    order_requests: Arc<RwLock<Vec<TiOrderRequest>>>,
    quote_requests: Arc<RwLock<Vec<TiQuoteRequest>>>,
    remittance_requests: Arc<RwLock<Vec<TiRemittanceRequest>>>,
}

impl MockTiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: Arc::new(RwLock::new(true)),
            ..Self::default()
        }
    }

    fn next_number(&self, base: u64) -> String {
        (base + self.sequence.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn check_failure(&self) -> Result<(), TiError> {
        if *self.should_fail.read().unwrap() {
            return Err(TiError::Api {
                status: 500,
                message: "Mock failure".to_string(),
            });
        }
        Ok(())
    }

    /// Replace what TI reports for an order
    pub fn set_order(&self, order: TiOrder) {
        self.orders
            .write()
            .unwrap()
            .insert(order.order_number.clone(), order);
    }

    pub fn set_quote(&self, quote: TiQuote) {
        self.quotes
            .write()
            .unwrap()
            .insert(quote.quote_number.clone(), quote);
    }

    pub fn set_asn(&self, asn: TiAsn) {
        self.asns
            .write()
            .unwrap()
            .insert(asn.order_number.clone(), asn);
    }

    pub fn set_invoices(&self, order_number: &str, invoices: Vec<TiInvoice>) {
        self.invoices
            .write()
            .unwrap()
            .insert(order_number.to_string(), invoices);
    }

    /// Make ASN lookups for one order fail
    pub fn fail_asn_for(&self, order_number: &str) {
        self.failing_asns
            .write()
            .unwrap()
            .insert(order_number.to_string());
    }

    pub fn submitted_orders(&self) -> Vec<TiOrderRequest> {
        self.order_requests.read().unwrap().clone()
    }

    pub fn submitted_quotes(&self) -> Vec<TiQuoteRequest> {
        self.quote_requests.read().unwrap().clone()
    }

    pub fn submitted_remittances(&self) -> Vec<TiRemittanceRequest> {
        self.remittance_requests.read().unwrap().clone()
    }
}

#[async_trait]
impl TiClient for MockTiClient {
    async fn create_quote(&self, request: &TiQuoteRequest) -> Result<TiQuote, TiError> {
        self.check_failure()?;
        self.quote_requests.write().unwrap().push(request.clone());

        let quote = TiQuote {
            quote_number: format!("Q{}", self.next_number(1_000_000)),
            quote_status: Some("Active".to_string()),
            currency: Some(request.currency.clone()),
            expiration_date: None,
            line_items: request
                .line_items
                .iter()
                .map(|l| TiQuoteLine {
                    ti_part_number: l.ti_part_number.clone(),
                    customer_part_number: l.customer_part_number.clone(),
                    quantity: l.quantity,
                    minimum_order_quantity: Some(250),
                    order_increment: Some(250),
                    price: Some(Decimal::new(40, 2)),
                })
                .collect(),
        };
        self.set_quote(quote.clone());
        Ok(quote)
    }

    async fn get_quote(&self, quote_number: &str) -> Result<TiQuote, TiError> {
        self.check_failure()?;
        self.quotes
            .read()
            .unwrap()
            .get(quote_number)
            .cloned()
            .ok_or_else(|| TiError::NotFound(format!("quote {}", quote_number)))
    }

    async fn create_order(&self, request: &TiOrderRequest) -> Result<TiOrder, TiError> {
        self.check_failure()?;
        self.order_requests.write().unwrap().push(request.clone());

        let order = TiOrder {
            order_number: self.next_number(7_000_000),
            customer_purchase_order_number: Some(request.customer_purchase_order_number.clone()),
            order_status: Some("Received".to_string()),
            currency: None,
            line_items: request
                .line_items
                .iter()
                .map(|l| TiOrderLine {
                    ti_part_number: l.ti_part_number.clone(),
                    customer_part_number: l.customer_part_number.clone(),
                    quantity: l.quantity,
                    unit_price: None,
                    status: None,
                    schedules: Vec::new(),
                })
                .collect(),
        };
        self.set_order(order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_number: &str) -> Result<TiOrder, TiError> {
        self.check_failure()?;
        self.orders
            .read()
            .unwrap()
            .get(order_number)
            .cloned()
            .ok_or_else(|| TiError::NotFound(format!("order {}", order_number)))
    }

    async fn get_asn(&self, order_number: &str) -> Result<TiAsn, TiError> {
        self.check_failure()?;
        if self.failing_asns.read().unwrap().contains(order_number) {
            return Err(TiError::Api {
                status: 503,
                message: "Mock ASN failure".to_string(),
            });
        }
        Ok(self
            .asns
            .read()
            .unwrap()
            .get(order_number)
            .cloned()
            .unwrap_or_else(|| TiAsn {
                order_number: order_number.to_string(),
                customer_purchase_order_number: None,
                shipments: Vec::new(),
            }))
    }

    async fn get_invoices(&self, order_number: &str) -> Result<Vec<TiInvoice>, TiError> {
        self.check_failure()?;
        Ok(self
            .invoices
            .read()
            .unwrap()
            .get(order_number)
            .cloned()
            .unwrap_or_default())
    }

    async fn submit_remittance(
        &self,
        request: &TiRemittanceRequest,
    ) -> Result<TiRemittanceAck, TiError> {
        self.check_failure()?;
        self.remittance_requests
            .write()
            .unwrap()
            .push(request.clone());
        Ok(TiRemittanceAck {
            remittance_id: format!("RN{}", self.next_number(500_000)),
            status: Some("Received".to_string()),
        })
    }
}
