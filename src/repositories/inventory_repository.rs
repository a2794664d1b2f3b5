use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::db::inventory_filter::{build_filter_query, InventoryFilterCriteria};
use crate::db::instrumented;
use crate::entities::{inventory_details, inventory_master};
use crate::errors::ServiceError;
use crate::models::{InventoryDetailsDraft, InventoryMaster, InventoryMasterDraft};
use crate::repositories::Repository;

use super::BaseRepository;

/// Storage gateway for products and their transactions.
///
/// `save_*` inserts when the draft carries no identity and otherwise
/// overwrites every mutable column of the existing row. Deletes are
/// idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn list_all_masters(&self) -> Result<Vec<InventoryMaster>, ServiceError>;

    async fn find_master_by_id(&self, id: i64) -> Result<Option<InventoryMaster>, ServiceError>;

    async fn save_master(&self, draft: InventoryMasterDraft)
        -> Result<InventoryMaster, ServiceError>;

    /// Removes the product and every transaction that references it.
    async fn delete_master_by_id(&self, id: i64) -> Result<(), ServiceError>;

    async fn find_detail_by_id(
        &self,
        id: i64,
    ) -> Result<Option<inventory_details::Model>, ServiceError>;

    async fn save_detail(
        &self,
        draft: InventoryDetailsDraft,
    ) -> Result<inventory_details::Model, ServiceError>;

    async fn delete_detail_by_id(&self, id: i64) -> Result<(), ServiceError>;

    async fn find_masters_by_filters(
        &self,
        criteria: InventoryFilterCriteria,
    ) -> Result<Vec<InventoryMaster>, ServiceError>;
}

/// SeaORM-backed gateway.
#[derive(Debug)]
pub struct SeaOrmInventoryRepository {
    base: BaseRepository,
}

impl SeaOrmInventoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Attaches the full transaction list to each product, preserving input order and duplicates.
    async fn attach_details(
        &self,
        masters: Vec<inventory_master::Model>,
    ) -> Result<Vec<InventoryMaster>, DbErr> {
        if masters.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<i64> = masters.iter().map(|m| m.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let details = inventory_details::Entity::find()
            .filter(inventory_details::Column::ProductId.is_in(ids))
            .order_by_asc(inventory_details::Column::TransactionId)
            .all(self.base.get_db())
            .await?;

        let mut by_product: HashMap<i64, Vec<inventory_details::Model>> = HashMap::new();
        for detail in details {
            if let Some(product_id) = detail.product_id {
                by_product.entry(product_id).or_default().push(detail);
            }
        }

        Ok(masters
            .into_iter()
            .map(|master| {
                let details = by_product
                    .get(&master.product_id)
                    .cloned()
                    .unwrap_or_default();
                InventoryMaster::new(master, details)
            })
            .collect())
    }

    async fn load_master(&self, id: i64) -> Result<Option<InventoryMaster>, DbErr> {
        let Some(master) = inventory_master::Entity::find_by_id(id)
            .one(self.base.get_db())
            .await?
        else {
            return Ok(None);
        };

        Ok(self.attach_details(vec![master]).await?.into_iter().next())
    }
}

fn master_active_model(draft: InventoryMasterDraft) -> inventory_master::ActiveModel {
    // dateAdded is left NotSet so an update never rewrites it.
    inventory_master::ActiveModel {
        product_id: match draft.product_id {
            Some(id) => ActiveValue::Unchanged(id),
            None => ActiveValue::NotSet,
        },
        product_name: ActiveValue::Set(draft.product_name),
        category: ActiveValue::Set(draft.category),
        brand: ActiveValue::Set(draft.brand),
        stock_in_hand: ActiveValue::Set(draft.stock_in_hand),
        unit_price: ActiveValue::Set(draft.unit_price),
        supplier_id: ActiveValue::Set(draft.supplier_id),
        date_added: ActiveValue::NotSet,
        last_updated: ActiveValue::NotSet,
        remarks: ActiveValue::Set(draft.remarks),
    }
}

fn detail_active_model(draft: InventoryDetailsDraft) -> inventory_details::ActiveModel {
    let product_id = draft.product_id();
    inventory_details::ActiveModel {
        transaction_id: match draft.transaction_id {
            Some(id) => ActiveValue::Unchanged(id),
            None => ActiveValue::NotSet,
        },
        product_id: ActiveValue::Set(product_id),
        transaction_type: ActiveValue::Set(draft.transaction_type),
        quantity: ActiveValue::Set(draft.quantity),
        transaction_date: ActiveValue::NotSet,
        transaction_description: ActiveValue::Set(draft.transaction_description),
        transaction_amount: ActiveValue::Set(draft.transaction_amount),
        transaction_status: ActiveValue::Set(draft.transaction_status),
        transaction_notes: ActiveValue::Set(draft.transaction_notes),
    }
}

/// A row deleted between lookup and overwrite reports zero affected rows.
fn not_updated_as_not_found(err: ServiceError, not_found: ServiceError) -> ServiceError {
    match err {
        ServiceError::DatabaseError(DbErr::RecordNotUpdated) => not_found,
        other => other,
    }
}

#[async_trait]
impl InventoryRepository for SeaOrmInventoryRepository {
    #[instrument(skip(self))]
    async fn list_all_masters(&self) -> Result<Vec<InventoryMaster>, ServiceError> {
        instrumented("list_all_masters", async {
            let masters = inventory_master::Entity::find()
                .order_by_asc(inventory_master::Column::ProductId)
                .all(self.base.get_db())
                .await?;
            self.attach_details(masters).await
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_master_by_id(&self, id: i64) -> Result<Option<InventoryMaster>, ServiceError> {
        instrumented("find_master_by_id", self.load_master(id)).await
    }

    #[instrument(skip(self, draft), fields(product_id = ?draft.product_id))]
    async fn save_master(
        &self,
        draft: InventoryMasterDraft,
    ) -> Result<InventoryMaster, ServiceError> {
        let existing_id = draft.product_id;
        let active_model = master_active_model(draft);

        let saved = instrumented("save_master", async {
            let model = if existing_id.is_some() {
                active_model.update(self.base.get_db()).await?
            } else {
                active_model.insert(self.base.get_db()).await?
            };
            self.attach_details(vec![model]).await
        })
        .await;

        match saved {
            Ok(mut records) => records
                .pop()
                .ok_or_else(|| ServiceError::InternalError("saved product not returned".into())),
            Err(err) => Err(not_updated_as_not_found(
                err,
                ServiceError::product_not_found(existing_id.unwrap_or_default()),
            )),
        }
    }

    #[instrument(skip(self))]
    async fn delete_master_by_id(&self, id: i64) -> Result<(), ServiceError> {
        instrumented("delete_master_by_id", async {
            let txn = self.base.get_db().begin().await?;

            let details = inventory_details::Entity::delete_many()
                .filter(inventory_details::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            let master = inventory_master::Entity::delete_by_id(id).exec(&txn).await?;

            txn.commit().await?;
            debug!(
                product_id = id,
                details_removed = details.rows_affected,
                product_removed = master.rows_affected,
                "product delete committed"
            );
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_detail_by_id(
        &self,
        id: i64,
    ) -> Result<Option<inventory_details::Model>, ServiceError> {
        instrumented(
            "find_detail_by_id",
            inventory_details::Entity::find_by_id(id).one(self.base.get_db()),
        )
        .await
    }

    #[instrument(skip(self, draft), fields(transaction_id = ?draft.transaction_id))]
    async fn save_detail(
        &self,
        draft: InventoryDetailsDraft,
    ) -> Result<inventory_details::Model, ServiceError> {
        let existing_id = draft.transaction_id;
        let active_model = detail_active_model(draft);

        let saved = instrumented("save_detail", async {
            if existing_id.is_some() {
                active_model.update(self.base.get_db()).await
            } else {
                active_model.insert(self.base.get_db()).await
            }
        })
        .await;

        saved.map_err(|err| {
            not_updated_as_not_found(
                err,
                ServiceError::detail_not_found(existing_id.unwrap_or_default()),
            )
        })
    }

    #[instrument(skip(self))]
    async fn delete_detail_by_id(&self, id: i64) -> Result<(), ServiceError> {
        instrumented(
            "delete_detail_by_id",
            inventory_details::Entity::delete_by_id(id).exec(self.base.get_db()),
        )
        .await
        .map(|_| ())
    }

    #[instrument(skip(self))]
    async fn find_masters_by_filters(
        &self,
        criteria: InventoryFilterCriteria,
    ) -> Result<Vec<InventoryMaster>, ServiceError> {
        instrumented("find_masters_by_filters", async {
            let masters = build_filter_query(&criteria)
                .all(self.base.get_db())
                .await?;
            self.attach_details(masters).await
        })
        .await
    }
}
