pub mod inventory;

pub use inventory::InventoryHandlerState;
