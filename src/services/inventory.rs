use crate::{
    db::inventory_filter::InventoryFilterCriteria,
    entities::inventory_details,
    errors::ServiceError,
    models::{InventoryDetailsDraft, InventoryMaster, InventoryMasterDraft},
    repositories::InventoryRepository,
};
use metrics::counter;
use std::sync::Arc;
use tracing::{info, instrument};

/// Business rules for products and their transactions.
///
/// Creates ignore caller-supplied identities. Updates require the record to
/// exist and then overwrite it wholesale. Deletes never fail on a missing id.
#[derive(Clone)]
pub struct InventoryService {
    repo: Arc<dyn InventoryRepository>,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(repo: Arc<dyn InventoryRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn get_all_inventories(&self) -> Result<Vec<InventoryMaster>, ServiceError> {
        self.repo.list_all_masters().await
    }

    #[instrument(skip(self))]
    pub async fn get_inventory_by_id(&self, id: i64) -> Result<InventoryMaster, ServiceError> {
        self.repo
            .find_master_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::product_not_found(id))
    }

    #[instrument(skip(self, draft))]
    pub async fn create_inventory(
        &self,
        mut draft: InventoryMasterDraft,
    ) -> Result<InventoryMaster, ServiceError> {
        draft.product_id = None;
        let created = self.repo.save_master(draft).await?;

        counter!("inventory.products.created", 1);
        info!(product_id = created.product_id(), "Inventory product created");
        Ok(created)
    }

    /// Replaces every mutable field of an existing product.
    #[instrument(skip(self, draft))]
    pub async fn update_inventory(
        &self,
        id: i64,
        mut draft: InventoryMasterDraft,
    ) -> Result<InventoryMaster, ServiceError> {
        if self.repo.find_master_by_id(id).await?.is_none() {
            return Err(ServiceError::product_not_found(id));
        }

        draft.product_id = Some(id);
        let updated = self.repo.save_master(draft).await?;

        counter!("inventory.products.updated", 1);
        info!(product_id = id, "Inventory product updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_inventory(&self, id: i64) -> Result<(), ServiceError> {
        self.repo.delete_master_by_id(id).await?;

        counter!("inventory.products.deleted", 1);
        info!(product_id = id, "Inventory product deleted");
        Ok(())
    }

    /// Records a transaction. The referenced product is not checked.
    #[instrument(skip(self, draft))]
    pub async fn create_inventory_details(
        &self,
        mut draft: InventoryDetailsDraft,
    ) -> Result<inventory_details::Model, ServiceError> {
        draft.transaction_id = None;
        let created = self.repo.save_detail(draft).await?;

        counter!("inventory.details.created", 1);
        info!(
            transaction_id = created.transaction_id,
            product_id = ?created.product_id,
            "Inventory transaction recorded"
        );
        Ok(created)
    }

    #[instrument(skip(self, draft))]
    pub async fn update_inventory_detail(
        &self,
        id: i64,
        mut draft: InventoryDetailsDraft,
    ) -> Result<inventory_details::Model, ServiceError> {
        if self.repo.find_detail_by_id(id).await?.is_none() {
            return Err(ServiceError::detail_not_found(id));
        }

        draft.transaction_id = Some(id);
        let updated = self.repo.save_detail(draft).await?;

        counter!("inventory.details.updated", 1);
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_inventory_detail(&self, id: i64) -> Result<(), ServiceError> {
        self.repo.delete_detail_by_id(id).await?;

        counter!("inventory.details.deleted", 1);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_inventory_by_filters(
        &self,
        criteria: InventoryFilterCriteria,
    ) -> Result<Vec<InventoryMaster>, ServiceError> {
        self.repo.find_masters_by_filters(criteria).await
    }
}
