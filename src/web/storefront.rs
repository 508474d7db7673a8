//! Public storefront routes: menu, categories, site content and checkout.

use super::{AppState, log_refresh};
use crate::{
    core::{
        cart::{Cart, Selection},
        menu,
        order::{OrderDraft, place_order},
        site::{AboutData, ContactData, LogoData},
    },
    entities::{MenuItemModel, order::OrderStatus},
    errors::Result,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// GET /api/menu?category=Burgers
pub async fn list_menu(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<MenuItemModel>>> {
    let items = menu::get_menu_items_by_category(&state.db, query.category.as_deref()).await?;
    Ok(Json(items))
}

/// GET /api/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.live.categories.current().as_ref().clone())
}

/// GET /api/site/about
pub async fn about(State(state): State<Arc<AppState>>) -> Json<AboutData> {
    Json(state.live.about.current().as_ref().clone())
}

/// GET /api/site/contact
pub async fn contact(State(state): State<Arc<AppState>>) -> Json<ContactData> {
    Json(state.live.contact.current().as_ref().clone())
}

/// GET /api/site/logo
pub async fn logo(State(state): State<Arc<AppState>>) -> Json<LogoData> {
    Json(state.live.logo.current().as_ref().clone())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub notes: String,
    pub items: Vec<Selection>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub id: String,
    pub order_number: String,
    pub total: String,
    pub status: OrderStatus,
}

/// POST /api/orders
///
/// The cart is rebuilt from the current menu snapshot, so prices and availability
/// are always the store's.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let menu = state.live.menu.current();
    let cart = Cart::from_selections(&menu, &request.items)?;
    let total = cart.formatted_total();

    let order = place_order(
        &state.db,
        &state.config,
        OrderDraft {
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            notes: request.notes,
            cart,
        },
    )
    .await?;
    log_refresh("orders", state.live.refresh_orders(&state.db).await);

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            id: order.id,
            order_number: order.order_number,
            total,
            status: order.status,
        }),
    ))
}
