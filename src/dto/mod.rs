pub mod analytics;
pub mod auth;
pub mod discounts;
pub mod menu;
pub mod orders;
