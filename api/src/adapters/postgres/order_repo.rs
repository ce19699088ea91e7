//! PostgreSQL adapter for OrderRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::document::{from_json, parse_status, to_json};
use crate::domain::entities::{NewOrder, Order, OrderFilter, OrderId, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::entity::orders;
use crate::error::DomainError;

/// PostgreSQL implementation of OrderRepository
pub struct PostgresOrderRepository {
    db: DatabaseConnection,
}

impl PostgresOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        column: orders::Column,
        value: &str,
    ) -> Result<Option<Order>, DomainError> {
        let result = orders::Entity::find()
            .filter(column.eq(value))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(Order::try_from).transpose()
    }
}

fn active_model(order: &Order) -> Result<orders::ActiveModel, DomainError> {
    Ok(orders::ActiveModel {
        id: Set(order.id.0),
        customer_purchase_order_number: Set(order.customer_purchase_order_number.clone()),
        ti_order_number: Set(order.ti_order_number.clone()),
        quotation_number: Set(order.quotation_number.clone()),
        status: Set(order.status.to_string()),
        currency: Set(order.currency.clone()),
        ship_to: Set(order.ship_to.clone()),
        notes: Set(order.notes.clone()),
        components: Set(to_json(&order.components)?),
        shipments: Set(to_json(&order.shipments)?),
        invoices: Set(to_json(&order.invoices)?),
        total_quantity: Set(order.total_quantity),
        total_price: Set(order.total_price),
        created_at: Set(order.created_at.fixed_offset()),
        updated_at: Set(order.updated_at.fixed_offset()),
        last_synced_at: Set(order.last_synced_at.map(|dt| dt.fixed_offset())),
    })
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let result = orders::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(Order::try_from).transpose()
    }

    async fn find_by_ti_order_number(&self, number: &str) -> Result<Option<Order>, DomainError> {
        self.find_one(orders::Column::TiOrderNumber, number).await
    }

    async fn find_by_purchase_order_number(
        &self,
        po: &str,
    ) -> Result<Option<Order>, DomainError> {
        self.find_one(orders::Column::CustomerPurchaseOrderNumber, po)
            .await
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, DomainError> {
        let mut query = orders::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(orders::Column::Status.eq(status.to_string()));
        }

        let results = query
            .order_by_desc(orders::Column::CreatedAt)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(Order::try_from).collect()
    }

    async fn find_submitted_with_status(
        &self,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, DomainError> {
        let results = orders::Entity::find()
            .filter(orders::Column::TiOrderNumber.is_not_null())
            .filter(orders::Column::Status.is_in(statuses.iter().map(|s| s.to_string())))
            .order_by_asc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(Order::try_from).collect()
    }

    async fn create(
        &self,
        new_order: &NewOrder,
        default_currency: &str,
    ) -> Result<Order, DomainError> {
        let order = new_order
            .clone()
            .into_order(OrderId::new(), default_currency)?;

        let result = active_model(&order)?
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Order::try_from(result)
    }

    async fn save(&self, order: &Order) -> Result<Order, DomainError> {
        let result = active_model(order)?
            .update(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => {
                    DomainError::NotFound(format!("Order {} not found", order.id))
                }
                other => DomainError::Database(other.to_string()),
            })?;

        Order::try_from(result)
    }

    async fn delete(&self, id: &OrderId) -> Result<(), DomainError> {
        let result = orders::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Order {} not found", id)));
        }
        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<orders::Model> for Order {
    type Error = DomainError;

    fn try_from(model: orders::Model) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId(model.id),
            customer_purchase_order_number: model.customer_purchase_order_number,
            ti_order_number: model.ti_order_number,
            quotation_number: model.quotation_number,
            status: parse_status(&model.status)?,
            currency: model.currency,
            ship_to: model.ship_to,
            notes: model.notes,
            components: from_json(model.components, "components")?,
            shipments: from_json(model.shipments, "shipments")?,
            invoices: from_json(model.invoices, "invoices")?,
            total_quantity: model.total_quantity,
            total_price: model.total_price,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            last_synced_at: model.last_synced_at.map(|dt| dt.with_timezone(&Utc)),
        })
    }
}
