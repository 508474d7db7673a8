//! Site document entity - Keyed JSON documents for site-wide content.
//! Used for the about, contact and logo sections and the category list,
//! each stored under a path-like key such as `siteConfig/about`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Site document database model - stores one JSON document per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_documents")]
pub struct Model {
    /// Document key (e.g., `"siteConfig/logo"`, `"config/categories"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Serialized JSON body of the document
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this document was last written
    pub updated_at: DateTimeUtc,
}

/// `SiteDocument` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
