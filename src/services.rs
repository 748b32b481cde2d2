pub mod auth;
pub mod crm_service;
pub mod dashboard_service;
pub mod inventory_service;
pub mod product_service;
pub mod quote_service;
pub mod seed;

pub use auth::AuthService;
pub use crm_service::CrmService;
pub use dashboard_service::DashboardService;
pub use inventory_service::{InventoryService, StockLock};
pub use product_service::{ProductService, ReferencePolicy};
pub use quote_service::QuoteService;
