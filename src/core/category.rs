//! Category list - the ordered menu sections stored as one document.

use crate::{
    core::site::{read_document, write_document},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub const CATEGORIES_KEY: &str = "config/categories";

/// Stored shape of the category document: `{"list": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryList {
    #[serde(default)]
    pub list: Vec<String>,
}

/// Loads the category list.
///
/// A missing document is created with `defaults`. A stored but empty list reads as
/// `defaults` without being rewritten.
#[instrument(skip_all)]
pub async fn load_categories(db: &DatabaseConnection, defaults: &[String]) -> Result<Vec<String>> {
    match read_document::<CategoryList>(db, CATEGORIES_KEY).await? {
        Some(stored) if !stored.list.is_empty() => Ok(stored.list),
        Some(_) => Ok(defaults.to_vec()),
        None => {
            let list = CategoryList {
                list: defaults.to_vec(),
            };
            write_document(db, CATEGORIES_KEY, &list).await?;
            info!("Created category document with {} defaults", list.list.len());
            Ok(list.list)
        }
    }
}

/// Replaces the whole list. Labels are trimmed; blanks and repeats are dropped.
pub async fn save_categories(db: &DatabaseConnection, categories: Vec<String>) -> Result<Vec<String>> {
    let mut list: Vec<String> = Vec::with_capacity(categories.len());
    for category in categories {
        let trimmed = category.trim();
        if !trimmed.is_empty() && !list.iter().any(|c| c == trimmed) {
            list.push(trimmed.to_string());
        }
    }
    write_document(db, CATEGORIES_KEY, &CategoryList { list: list.clone() }).await?;
    Ok(list)
}

/// Appends a category. Adding a label that already exists leaves the list unchanged.
#[instrument(skip(db, defaults))]
pub async fn add_category(
    db: &DatabaseConnection,
    defaults: &[String],
    name: &str,
) -> Result<Vec<String>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }

    let mut categories = load_categories(db, defaults).await?;
    if categories.iter().any(|c| c == name) {
        return Ok(categories);
    }
    categories.push(name.to_string());
    save_categories(db, categories).await
}

/// Removes a category label. Menu items that use it keep their label.
#[instrument(skip(db, defaults))]
pub async fn remove_category(
    db: &DatabaseConnection,
    defaults: &[String],
    name: &str,
) -> Result<Vec<String>> {
    let mut categories = load_categories(db, defaults).await?;
    categories.retain(|c| c != name);
    let saved = save_categories(db, categories).await?;
    if saved.is_empty() {
        return Ok(defaults.to_vec());
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    fn defaults() -> Vec<String> {
        vec!["Burgers".to_string(), "Sides".to_string(), "Bebidas".to_string()]
    }

    #[tokio::test]
    async fn test_absent_document_created_with_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(read_document::<CategoryList>(&db, CATEGORIES_KEY).await?.is_none());

        let categories = load_categories(&db, &defaults()).await?;
        assert_eq!(categories, defaults());

        let stored: Option<CategoryList> = read_document(&db, CATEGORIES_KEY).await?;
        assert_eq!(stored.map(|c| c.list), Some(defaults()));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_list_falls_back_without_write() -> Result<()> {
        let db = setup_test_db().await?;
        write_document(&db, CATEGORIES_KEY, &CategoryList::default()).await?;

        let categories = load_categories(&db, &defaults()).await?;
        assert_eq!(categories, defaults());

        let stored: Option<CategoryList> = read_document(&db, CATEGORIES_KEY).await?;
        assert_eq!(stored, Some(CategoryList::default()));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_and_remove_category() -> Result<()> {
        let db = setup_test_db().await?;

        let categories = add_category(&db, &defaults(), "  Postres ").await?;
        assert_eq!(categories.last().map(String::as_str), Some("Postres"));
        assert_eq!(categories.len(), 4);

        let again = add_category(&db, &defaults(), "Postres").await?;
        assert_eq!(again.len(), 4);

        let categories = remove_category(&db, &defaults(), "Sides").await?;
        assert_eq!(categories, vec!["Burgers", "Bebidas", "Postres"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_blank_category_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_category(&db, &defaults(), "   ").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_categories_cleans_labels() -> Result<()> {
        let db = setup_test_db().await?;
        let saved = save_categories(
            &db,
            vec![" Combos".to_string(), String::new(), "Combos".to_string(), "Kids".to_string()],
        )
        .await?;
        assert_eq!(saved, vec!["Combos", "Kids"]);
        assert_eq!(load_categories(&db, &defaults()).await?, saved);
        Ok(())
    }
}
