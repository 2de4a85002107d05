pub mod audit_logs;
pub mod discounts;
pub mod menus;
pub mod order_items;
pub mod orders;
pub mod sessions;
pub mod users;
pub mod variants;

pub use audit_logs::Entity as AuditLogs;
pub use discounts::Entity as Discounts;
pub use menus::Entity as Menus;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use sessions::Entity as Sessions;
pub use users::Entity as Users;
pub use variants::Entity as Variants;
