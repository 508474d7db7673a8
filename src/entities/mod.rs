//! Entity module - Contains all SeaORM entity definitions for the storefront.
//! These entities represent the stored documents: menu items, orders, and the
//! keyed site documents (about, contact, logo, categories).

pub mod menu_item;
pub mod order;
pub mod site_document;

// Re-export specific types to avoid conflicts
pub use menu_item::{Column as MenuItemColumn, Entity as MenuItem, Model as MenuItemModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use site_document::{
    Column as SiteDocumentColumn, Entity as SiteDocument, Model as SiteDocumentModel,
};
