pub mod inventory;

pub use inventory::{InventoryDetailsDraft, InventoryMaster, InventoryMasterDraft, MasterReference};
