//! PostgreSQL adapter for RemittanceRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

use super::document::{from_json, parse_status, to_json};
use crate::domain::entities::{NewRemittance, RemittanceId, RemittanceNotification};
use crate::domain::ports::RemittanceRepository;
use crate::entity::remittances;
use crate::error::DomainError;

/// PostgreSQL implementation of RemittanceRepository
pub struct PostgresRemittanceRepository {
    db: DatabaseConnection,
}

impl PostgresRemittanceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active_model(
    remittance: &RemittanceNotification,
) -> Result<remittances::ActiveModel, DomainError> {
    Ok(remittances::ActiveModel {
        id: Set(remittance.id.0),
        reference: Set(remittance.reference.clone()),
        status: Set(remittance.status.to_string()),
        ti_reference: Set(remittance.ti_reference.clone()),
        payment_date: Set(remittance.payment_date),
        currency: Set(remittance.currency.clone()),
        payment_method: Set(remittance.payment_method.clone()),
        items: Set(to_json(&remittance.items)?),
        total_amount: Set(remittance.total_amount),
        created_at: Set(remittance.created_at.fixed_offset()),
        updated_at: Set(remittance.updated_at.fixed_offset()),
    })
}

#[async_trait]
impl RemittanceRepository for PostgresRemittanceRepository {
    async fn find_by_id(
        &self,
        id: &RemittanceId,
    ) -> Result<Option<RemittanceNotification>, DomainError> {
        let result = remittances::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(RemittanceNotification::try_from).transpose()
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RemittanceNotification>, DomainError> {
        let results = remittances::Entity::find()
            .order_by_desc(remittances::Column::CreatedAt)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results
            .into_iter()
            .map(RemittanceNotification::try_from)
            .collect()
    }

    async fn create(
        &self,
        new_remittance: &NewRemittance,
        default_currency: &str,
    ) -> Result<RemittanceNotification, DomainError> {
        let remittance = new_remittance
            .clone()
            .into_remittance(RemittanceId::new(), default_currency)?;

        let result = active_model(&remittance)?
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        RemittanceNotification::try_from(result)
    }

    async fn save(
        &self,
        remittance: &RemittanceNotification,
    ) -> Result<RemittanceNotification, DomainError> {
        let result = active_model(remittance)?
            .update(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => {
                    DomainError::NotFound(format!("Remittance {} not found", remittance.id))
                }
                other => DomainError::Database(other.to_string()),
            })?;

        RemittanceNotification::try_from(result)
    }

    async fn delete(&self, id: &RemittanceId) -> Result<(), DomainError> {
        let result = remittances::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Remittance {} not found", id)));
        }
        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<remittances::Model> for RemittanceNotification {
    type Error = DomainError;

    fn try_from(model: remittances::Model) -> Result<Self, Self::Error> {
        Ok(RemittanceNotification {
            id: RemittanceId(model.id),
            reference: model.reference,
            status: parse_status(&model.status)?,
            ti_reference: model.ti_reference,
            payment_date: model.payment_date,
            currency: model.currency,
            payment_method: model.payment_method,
            items: from_json(model.items, "items")?,
            total_amount: model.total_amount,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}
