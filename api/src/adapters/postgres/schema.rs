//! Table bootstrap
//!
//! Creates the document tables on startup when they are missing.

use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Schema};

use crate::entity::{orders, quotations, remittances};
use crate::error::DomainError;

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DomainError>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;
    Ok(())
}

/// Ensure every table exists
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DomainError> {
    let schema = Schema::new(db.get_database_backend());
    create_table(db, &schema, orders::Entity).await?;
    create_table(db, &schema, quotations::Entity).await?;
    create_table(db, &schema, remittances::Entity).await?;
    tracing::debug!("Database schema ready");
    Ok(())
}
