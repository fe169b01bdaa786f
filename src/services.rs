pub mod inventory_service;

pub use inventory_service::{EoqOutput, InventoryReport, InventoryService, ServiceError};
