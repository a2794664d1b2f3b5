use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single transaction recorded against a product.
///
/// The owning product id is stored but never serialized, so responses do not
/// echo the back-reference.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_details")]
#[serde(rename_all = "camelCase")]
#[schema(as = InventoryDetails)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub transaction_id: i64,
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub product_id: Option<i64>,
    #[sea_orm(nullable)]
    pub transaction_type: Option<String>,
    pub quantity: i32,
    pub transaction_date: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub transaction_description: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub transaction_amount: f64,
    #[sea_orm(nullable)]
    pub transaction_status: Option<TransactionStatus>,
    #[sea_orm(column_type = "String(StringLen::N(2500))", nullable)]
    pub transaction_notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_master::Entity",
        from = "Column::ProductId",
        to = "super::inventory_master::Column::ProductId"
    )]
    InventoryMaster,
}

impl Related<super::inventory_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryMaster.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            active_model.transaction_date = Set(Utc::now());
        }
        Ok(active_model)
    }
}

/// Descriptive lifecycle tag of a transaction. Accepted in lower, upper or title case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "pending")]
    #[serde(alias = "PENDING", alias = "Pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    #[serde(alias = "COMPLETED", alias = "Completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    #[serde(alias = "CANCELLED", alias = "Cancelled")]
    Cancelled,
}

impl std::str::FromStr for TransactionStatus {
    type Err = serde::de::value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use serde::de::IntoDeserializer;
        Self::deserialize(s.into_deserializer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_upper_and_lower_case() {
        for raw in ["\"completed\"", "\"COMPLETED\"", "\"Completed\""] {
            let status: TransactionStatus = serde_json::from_str(raw).unwrap();
            assert_eq!(status, TransactionStatus::Completed);
        }
        assert!(serde_json::from_str::<TransactionStatus>("\"shipped\"").is_err());
    }

    #[test]
    fn status_parses_from_query_text() {
        assert_eq!("Pending".parse::<TransactionStatus>().unwrap(), TransactionStatus::Pending);
        assert!("shipped".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn detail_json_omits_owning_product() {
        let detail = Model {
            transaction_id: 9,
            product_id: Some(1),
            transaction_type: Some("sale".into()),
            quantity: 5,
            transaction_date: Utc::now(),
            transaction_description: None,
            transaction_amount: 49.5,
            transaction_status: Some(TransactionStatus::Pending),
            transaction_notes: None,
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("productId").is_none());
        assert!(json.get("inventoryMaster").is_none());
        assert_eq!(json["transactionId"], 9);
        assert_eq!(json["transactionStatus"], "pending");
    }
}
