//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating menu items, orders and app state with sensible defaults.

use crate::{
    config::{admin::AdminCredential, store::StoreConfig},
    core::{
        cart::{Cart, CartItem},
        menu::{self, MenuItemInput},
        order::{OrderDraft, place_order},
    },
    entities::{MenuItemModel, OrderModel},
    errors::Result,
    web::AppState,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Password accepted by the admin credential of [`test_state`].
pub const TEST_ADMIN_PASSWORD: &str = "secret";

/// Routes tracing output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Menu item input with sensible defaults.
///
/// # Defaults
/// * `description`: "Test item"
/// * `image`: none
/// * `tag`: none
/// * `available`: true
#[must_use]
pub fn menu_input(name: &str, category: &str, price: &str) -> MenuItemInput {
    MenuItemInput {
        name: name.to_string(),
        description: "Test item".to_string(),
        price: price.to_string(),
        category: category.to_string(),
        image: String::new(),
        tag: None,
        available: true,
    }
}

/// Creates an available menu item.
pub async fn create_test_menu_item(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
    price: &str,
) -> Result<MenuItemModel> {
    menu::create_menu_item(db, menu_input(name, category, price)).await
}

/// Places a pending order for `customer` holding one "Classic" burger at 5.00.
pub async fn place_test_order(
    db: &DatabaseConnection,
    config: &StoreConfig,
    customer: &str,
) -> Result<OrderModel> {
    let mut cart = Cart::new();
    cart.add(CartItem {
        id: "classic".to_string(),
        name: "Classic".to_string(),
        price: "5.00".to_string(),
        image: String::new(),
    })?;

    place_order(
        db,
        config,
        OrderDraft {
            customer_name: customer.to_string(),
            customer_phone: "0991234567".to_string(),
            notes: String::new(),
            cart,
        },
    )
    .await
}

/// Full app state over a fresh database, default config and [`TEST_ADMIN_PASSWORD`].
pub async fn test_state() -> Result<Arc<AppState>> {
    let db = setup_test_db().await?;
    let admin = AdminCredential::from_password(TEST_ADMIN_PASSWORD)?;
    AppState::new(db, StoreConfig::default(), admin).await
}
