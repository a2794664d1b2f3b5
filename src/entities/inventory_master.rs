use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A product tracked in inventory.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_master")]
#[serde(rename_all = "camelCase")]
#[schema(as = InventoryMasterRecord)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub product_id: i64,
    #[sea_orm(nullable)]
    pub product_name: Option<String>,
    #[sea_orm(nullable)]
    pub category: Option<String>,
    #[sea_orm(nullable)]
    pub brand: Option<String>,
    pub stock_in_hand: i32,
    #[sea_orm(column_type = "Double")]
    pub unit_price: f64,
    #[sea_orm(nullable)]
    pub supplier_id: Option<i64>,
    pub date_added: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub remarks: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_details::Entity")]
    InventoryDetails,
}

impl Related<super::inventory_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryDetails.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            active_model.date_added = Set(now);
        }
        active_model.last_updated = Set(now);
        Ok(active_model)
    }
}
