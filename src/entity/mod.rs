pub mod audit_logs;
pub mod categories;
pub mod extras;
pub mod menu_items;
pub mod order_item_extras;
pub mod order_items;
pub mod orders;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use extras::Entity as Extras;
pub use menu_items::Entity as MenuItems;
pub use order_item_extras::Entity as OrderItemExtras;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
