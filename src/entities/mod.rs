pub mod inventory_details;
pub mod inventory_master;

pub use inventory_details::TransactionStatus;
