pub mod analytics_service;
pub mod auth_service;
pub mod discount_service;
pub mod export_service;
pub mod menu_service;
pub mod order_service;
