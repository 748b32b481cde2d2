pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod inventory;
pub mod products;
pub mod quotes;
