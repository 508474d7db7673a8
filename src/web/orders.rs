//! Admin order routes: list, workflow actions, delete and the `WhatsApp` link.

use super::{AppState, auth::AdminSession, log_refresh};
use crate::{
    core::{
        order::{self, advance_order, cancel_order, delete_order, set_order_status},
        report::{OrderStats, summarize_orders},
        whatsapp::order_link,
    },
    entities::{OrderModel, order::OrderStatus},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    /// A status name or `all`
    pub status: Option<String>,
}

/// An order as the admin panel shows it, with the status in Spanish.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: OrderModel,
    pub status_label: &'static str,
}

impl From<OrderModel> for OrderView {
    fn from(order: OrderModel) -> Self {
        Self {
            status_label: order.status.label(),
            order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderView>,
    /// Counts over all orders, independent of the filter
    pub stats: OrderStats,
}

/// GET /api/admin/orders?status=pending
pub async fn list(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Query(query): Query<StatusQuery>,
) -> Result<Json<OrderListResponse>> {
    let filter = match query.status.as_deref() {
        None | Some("all") => None,
        Some(value) => Some(value.parse::<OrderStatus>()?),
    };

    let all = state.live.orders.current();
    let orders = all
        .iter()
        .filter(|o| filter.is_none_or(|status| o.status == status))
        .cloned()
        .map(OrderView::from)
        .collect();

    Ok(Json(OrderListResponse {
        orders,
        stats: summarize_orders(&all),
    }))
}

/// GET /api/admin/orders/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<OrderView>> {
    order::get_order_by_id(&state.db, &id)
        .await?
        .map(|order| Json(order.into()))
        .ok_or_else(|| Error::OrderNotFound { id: id.clone() })
}

async fn after_write(state: &AppState, result: Result<OrderModel>) -> Result<Json<OrderView>> {
    let order = result?;
    log_refresh("orders", state.live.refresh_orders(&state.db).await);
    Ok(Json(order.into()))
}

/// POST /api/admin/orders/{id}/advance
pub async fn advance(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<OrderView>> {
    after_write(&state, advance_order(&state.db, &id).await).await
}

/// POST /api/admin/orders/{id}/cancel
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<OrderView>> {
    after_write(&state, cancel_order(&state.db, &id).await).await
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// PUT /api/admin/orders/{id}/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<OrderView>> {
    after_write(&state, set_order_status(&state.db, &id, update.status).await).await
}

/// DELETE /api/admin/orders/{id}
pub async fn remove(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    delete_order(&state.db, &id).await?;
    log_refresh("orders", state.live.refresh_orders(&state.db).await);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct WhatsAppLink {
    pub url: String,
}

/// GET /api/admin/orders/{id}/whatsapp
pub async fn whatsapp(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<WhatsAppLink>> {
    let order = order::get_order_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| Error::OrderNotFound { id: id.clone() })?;
    Ok(Json(WhatsAppLink {
        url: order_link(&order, &state.config),
    }))
}
