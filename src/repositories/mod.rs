//! Persistence gateways over the SeaORM connection.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod inventory_repository;

pub use inventory_repository::{InventoryRepository, SeaOrmInventoryRepository};

/// Access to the shared connection pool.
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

/// Connection holder embedded by concrete repositories.
#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
