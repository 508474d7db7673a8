//! Menu item entity - A dish or drink offered on the storefront.
//!
//! The price is kept as the exact decimal string the admin typed (e.g. `"8.50"`).
//! It is only converted to integer cents when a cart or order total is computed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Opaque identifier assigned on creation (UUID v4)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name (e.g., "Double Smash")
    pub name: String,
    /// Free-text description shown on the menu card
    pub description: String,
    /// Unit price as an exact decimal string, never a float
    pub price: String,
    /// Category label, one of the configured categories
    pub category: String,
    /// Inline `data:` URL of the compressed photo, empty when there is none
    #[sea_orm(column_type = "Text")]
    pub image: String,
    /// Optional badge such as "Nuevo" or "Popular"
    pub tag: Option<String>,
    /// Unavailable items stay listed but cannot be added to a cart
    pub available: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
