//! PostgreSQL adapter for QuotationRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::document::{from_json, parse_status, to_json};
use crate::domain::entities::{NewQuotation, Quotation, QuotationId};
use crate::domain::ports::QuotationRepository;
use crate::entity::quotations;
use crate::error::DomainError;

/// PostgreSQL implementation of QuotationRepository
pub struct PostgresQuotationRepository {
    db: DatabaseConnection,
}

impl PostgresQuotationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active_model(quotation: &Quotation) -> Result<quotations::ActiveModel, DomainError> {
    Ok(quotations::ActiveModel {
        id: Set(quotation.id.0),
        reference: Set(quotation.reference.clone()),
        quote_number: Set(quotation.quote_number.clone()),
        status: Set(quotation.status.to_string()),
        currency: Set(quotation.currency.clone()),
        expiration_date: Set(quotation.expiration_date),
        components: Set(to_json(&quotation.components)?),
        total_quantity: Set(quotation.total_quantity),
        total_price: Set(quotation.total_price),
        created_at: Set(quotation.created_at.fixed_offset()),
        updated_at: Set(quotation.updated_at.fixed_offset()),
    })
}

#[async_trait]
impl QuotationRepository for PostgresQuotationRepository {
    async fn find_by_id(&self, id: &QuotationId) -> Result<Option<Quotation>, DomainError> {
        let result = quotations::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(Quotation::try_from).transpose()
    }

    async fn find_by_quote_number(
        &self,
        number: &str,
    ) -> Result<Option<Quotation>, DomainError> {
        let result = quotations::Entity::find()
            .filter(quotations::Column::QuoteNumber.eq(number))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(Quotation::try_from).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Quotation>, DomainError> {
        let results = quotations::Entity::find()
            .order_by_desc(quotations::Column::CreatedAt)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(Quotation::try_from).collect()
    }

    async fn create(
        &self,
        new_quotation: &NewQuotation,
        default_currency: &str,
    ) -> Result<Quotation, DomainError> {
        let quotation = new_quotation
            .clone()
            .into_quotation(QuotationId::new(), default_currency)?;

        let result = active_model(&quotation)?
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Quotation::try_from(result)
    }

    async fn save(&self, quotation: &Quotation) -> Result<Quotation, DomainError> {
        let result = active_model(quotation)?
            .update(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => {
                    DomainError::NotFound(format!("Quotation {} not found", quotation.id))
                }
                other => DomainError::Database(other.to_string()),
            })?;

        Quotation::try_from(result)
    }

    async fn delete(&self, id: &QuotationId) -> Result<(), DomainError> {
        let result = quotations::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Quotation {} not found", id)));
        }
        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<quotations::Model> for Quotation {
    type Error = DomainError;

    fn try_from(model: quotations::Model) -> Result<Self, Self::Error> {
        Ok(Quotation {
            id: QuotationId(model.id),
            reference: model.reference,
            quote_number: model.quote_number,
            status: parse_status(&model.status)?,
            currency: model.currency,
            expiration_date: model.expiration_date,
            components: from_json(model.components, "components")?,
            total_quantity: model.total_quantity,
            total_price: model.total_price,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}
