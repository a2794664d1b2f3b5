use crate::entities::{inventory_details, inventory_master, TransactionStatus};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Maximum length of free-text transaction notes.
pub const MAX_TRANSACTION_NOTES: usize = 2500;

/// An explicit `null` on a numeric field reads as zero, like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A product together with every transaction recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMaster {
    #[serde(flatten)]
    pub master: inventory_master::Model,
    pub inventory_details: Vec<inventory_details::Model>,
}

impl InventoryMaster {
    pub fn new(
        master: inventory_master::Model,
        inventory_details: Vec<inventory_details::Model>,
    ) -> Self {
        Self {
            master,
            inventory_details,
        }
    }

    pub fn product_id(&self) -> i64 {
        self.master.product_id
    }
}

/// Product payload accepted on create and update.
///
/// `productId` is ignored on create and overwritten with the path id on update.
/// Timestamps and `inventoryDetails` in the body are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMasterDraft {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    #[schema(example = "Widget")]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock_in_hand: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(range(min = 0.0))]
    #[schema(example = 9.99)]
    pub unit_price: f64,
    #[serde(default)]
    pub supplier_id: Option<i64>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Reference to the owning product: either a bare id or `{"productId": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum MasterReference {
    Id(i64),
    Object {
        #[serde(rename = "productId")]
        product_id: i64,
    },
}

impl MasterReference {
    pub fn product_id(&self) -> i64 {
        match self {
            MasterReference::Id(id) => *id,
            MasterReference::Object { product_id } => *product_id,
        }
    }
}

/// Transaction payload accepted on create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDetailsDraft {
    #[serde(default)]
    pub transaction_id: Option<i64>,
    #[serde(default)]
    pub inventory_master: Option<MasterReference>,
    #[serde(default)]
    #[schema(example = "sale")]
    pub transaction_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: i32,
    #[serde(default)]
    pub transaction_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transaction_amount: f64,
    #[serde(default)]
    pub transaction_status: Option<TransactionStatus>,
    #[serde(default)]
    #[validate(length(max = 2500))]
    pub transaction_notes: Option<String>,
}

impl InventoryDetailsDraft {
    pub fn product_id(&self) -> Option<i64> {
        self.inventory_master.map(|reference| reference.product_id())
    }
}
