//! `orders` table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub customer_purchase_order_number: String,
    #[sea_orm(nullable, indexed)]
    pub ti_order_number: Option<String>,
    #[sea_orm(nullable)]
    pub quotation_number: Option<String>,
    #[sea_orm(indexed)]
    pub status: String,
    pub currency: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub ship_to: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub components: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub shipments: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub invoices: Json,
    pub total_quantity: i64,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub total_price: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub last_synced_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
