//! Menu business logic - create, list, update and delete menu items.
//!
//! Prices arrive from the admin form as text (or a JSON number), are sanitised and
//! checked to parse, and are then stored as strings.

use crate::{
    core::money::{deserialize_price, normalize_price},
    entities::{MenuItem, MenuItemColumn, MenuItemModel, menu_item},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Fields for a new menu item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

/// Partial update; absent fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    /// `Some("")` clears the tag
    pub tag: Option<String>,
    pub available: Option<bool>,
}

fn deserialize_optional_price<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_price(deserializer).map(Some)
}

fn clean_tag(tag: Option<String>) -> Option<String> {
    tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn require_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// All menu items in creation order.
pub async fn get_all_menu_items(db: &DatabaseConnection) -> Result<Vec<MenuItemModel>> {
    MenuItem::find()
        .order_by_asc(MenuItemColumn::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Items of one category; `None` or `"all"` returns the full menu.
pub async fn get_menu_items_by_category(
    db: &DatabaseConnection,
    category: Option<&str>,
) -> Result<Vec<MenuItemModel>> {
    let mut query = MenuItem::find();
    if let Some(category) = category.filter(|c| !c.eq_ignore_ascii_case("all")) {
        query = query.filter(MenuItemColumn::Category.eq(category));
    }
    query
        .order_by_asc(MenuItemColumn::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_menu_item_by_id(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<MenuItemModel>> {
    MenuItem::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Validates and inserts a new menu item with a fresh UUID.
///
/// The name and category must be non-empty and the price must parse as a
/// non-negative amount. All validation happens before any write.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_menu_item(
    db: &DatabaseConnection,
    input: MenuItemInput,
) -> Result<MenuItemModel> {
    let name = require_text(&input.name, "Name")?;
    let category = require_text(&input.category, "Category")?;
    let price = normalize_price(&input.price)?;

    let now = Utc::now();
    let item = menu_item::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(name),
        description: Set(input.description.trim().to_string()),
        price: Set(price),
        category: Set(category),
        image: Set(input.image),
        tag: Set(clean_tag(input.tag)),
        available: Set(input.available),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = item.insert(db).await?;
    info!("Created menu item {} ({})", created.name, created.id);
    Ok(created)
}

/// Applies a partial update to an existing menu item.
#[instrument(skip(db, patch))]
pub async fn update_menu_item(
    db: &DatabaseConnection,
    id: &str,
    patch: MenuItemPatch,
) -> Result<MenuItemModel> {
    let existing = get_menu_item_by_id(db, id)
        .await?
        .ok_or_else(|| Error::MenuItemNotFound { id: id.to_string() })?;

    let mut item: menu_item::ActiveModel = existing.into();
    if let Some(name) = patch.name {
        item.name = Set(require_text(&name, "Name")?);
    }
    if let Some(category) = patch.category {
        item.category = Set(require_text(&category, "Category")?);
    }
    if let Some(price) = patch.price {
        item.price = Set(normalize_price(&price)?);
    }
    if let Some(description) = patch.description {
        item.description = Set(description.trim().to_string());
    }
    if let Some(image) = patch.image {
        item.image = Set(image);
    }
    if patch.tag.is_some() {
        item.tag = Set(clean_tag(patch.tag));
    }
    if let Some(available) = patch.available {
        item.available = Set(available);
    }
    item.updated_at = Set(Utc::now());

    item.update(db).await.map_err(Into::into)
}

/// Permanently removes a menu item.
#[instrument(skip(db))]
pub async fn delete_menu_item(db: &DatabaseConnection, id: &str) -> Result<()> {
    let result = MenuItem::delete_by_id(id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::MenuItemNotFound { id: id.to_string() });
    }
    info!("Deleted menu item {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_menu_item, menu_input, setup_test_db};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_menu_item_stores_exact_price() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = menu_input("Classic", "Burgers", "5.00");
        input.tag = Some("  Nuevo ".to_string());

        let item = create_menu_item(&db, input).await?;
        assert_eq!(item.price, "5.00");
        assert_eq!(item.tag.as_deref(), Some("Nuevo"));
        assert!(item.available);
        assert_eq!(item.id.len(), 36);

        let fetched = get_menu_item_by_id(&db, &item.id).await?;
        assert_eq!(fetched.map(|f| (f.id, f.price)), Some((item.id, item.price)));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_menu_item_validation() -> Result<()> {
        // Validation failures never reach the database
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_menu_item(&db, menu_input("  ", "Burgers", "5.00")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_menu_item(&db, menu_input("Classic", "", "5.00")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_menu_item(&db, menu_input("Classic", "Burgers", "abc")).await;
        assert!(matches!(result, Err(Error::InvalidPrice { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_by_category() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_menu_item(&db, "Classic", "Burgers", "5.00").await?;
        create_test_menu_item(&db, "Fries", "Sides", "2.50").await?;
        create_test_menu_item(&db, "Double", "Burgers", "7.00").await?;

        let burgers = get_menu_items_by_category(&db, Some("Burgers")).await?;
        assert_eq!(burgers.len(), 2);
        assert!(burgers.iter().all(|i| i.category == "Burgers"));

        let all = get_menu_items_by_category(&db, Some("all")).await?;
        assert_eq!(all.len(), 3);
        assert_eq!(get_menu_items_by_category(&db, None).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_menu_item_partial() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_menu_item(&db, "Classic", "Burgers", "5.00").await?;

        let patch = MenuItemPatch {
            price: Some("5.5.0".to_string()),
            available: Some(false),
            ..Default::default()
        };
        let updated = update_menu_item(&db, &item.id, patch).await?;

        assert_eq!(updated.name, "Classic");
        assert_eq!(updated.price, "5.50");
        assert!(!updated.available);

        let cleared = update_menu_item(
            &db,
            &item.id,
            MenuItemPatch {
                tag: Some(String::new()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(cleared.tag, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_item() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_menu_item(&db, "missing", MenuItemPatch::default()).await;
        assert!(matches!(result, Err(Error::MenuItemNotFound { .. })));

        let result = delete_menu_item(&db, "missing").await;
        assert!(matches!(result, Err(Error::MenuItemNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_menu_item() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_menu_item(&db, "Fries", "Sides", "2.50").await?;
        delete_menu_item(&db, &item.id).await?;
        assert!(get_menu_item_by_id(&db, &item.id).await?.is_none());
        Ok(())
    }

    #[test]
    fn test_input_accepts_numeric_price() {
        let input: MenuItemInput = serde_json::from_str(
            r#"{"name": "Cola", "price": 1.5, "category": "Bebidas"}"#,
        )
        .unwrap_or_else(|e| panic!("payload should parse: {e}"));
        assert_eq!(input.price, "1.5");
        assert!(input.available);
        assert!(input.image.is_empty());
    }
}
