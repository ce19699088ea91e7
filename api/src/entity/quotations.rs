//! `quotations` table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quotations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reference: String,
    #[sea_orm(nullable, indexed)]
    pub quote_number: Option<String>,
    pub status: String,
    pub currency: String,
    #[sea_orm(nullable)]
    pub expiration_date: Option<Date>,
    #[sea_orm(column_type = "JsonBinary")]
    pub components: Json,
    pub total_quantity: i64,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub total_price: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
