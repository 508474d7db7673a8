//! Admin menu routes: items, categories and image uploads.

use super::{AppState, auth::AdminSession, log_refresh, storefront::CategoryQuery};
use crate::{
    core::{
        category,
        image::compress_image_async,
        menu::{self, MenuItemInput, MenuItemPatch},
    },
    entities::MenuItemModel,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Compressed uploads above this size are refused.
pub const MAX_UPLOAD_KB: usize = 900;

/// GET /api/admin/menu?category=all
pub async fn list(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<MenuItemModel>>> {
    let items = menu::get_menu_items_by_category(&state.db, query.category.as_deref()).await?;
    Ok(Json(items))
}

/// POST /api/admin/menu
pub async fn create(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(input): Json<MenuItemInput>,
) -> Result<(StatusCode, Json<MenuItemModel>)> {
    let item = menu::create_menu_item(&state.db, input).await?;
    log_refresh("menu", state.live.refresh_menu(&state.db).await);
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/admin/menu/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(patch): Json<MenuItemPatch>,
) -> Result<Json<MenuItemModel>> {
    let item = menu::update_menu_item(&state.db, &id, patch).await?;
    log_refresh("menu", state.live.refresh_menu(&state.db).await);
    Ok(Json(item))
}

/// DELETE /api/admin/menu/{id}
pub async fn remove(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    menu::delete_menu_item(&state.db, &id).await?;
    log_refresh("menu", state.live.refresh_menu(&state.db).await);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CategoryName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryListBody {
    pub list: Vec<String>,
}

async fn categories_changed(state: &AppState, list: Vec<String>) -> Json<Vec<String>> {
    log_refresh("categories", state.live.refresh_categories(&state.db).await);
    Json(list)
}

/// POST /api/admin/categories
pub async fn add_category(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(body): Json<CategoryName>,
) -> Result<Json<Vec<String>>> {
    let list = category::add_category(
        &state.db,
        &state.config.store.default_categories,
        &body.name,
    )
    .await?;
    Ok(categories_changed(&state, list).await)
}

/// DELETE /api/admin/categories/{name}
pub async fn remove_category(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>> {
    let list = category::remove_category(
        &state.db,
        &state.config.store.default_categories,
        &name,
    )
    .await?;
    Ok(categories_changed(&state, list).await)
}

/// PUT /api/admin/categories
pub async fn replace_categories(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(body): Json<CategoryListBody>,
) -> Result<Json<Vec<String>>> {
    let list = category::save_categories(&state.db, body.list).await?;
    Ok(categories_changed(&state, list).await)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub data_url: String,
    pub size_kb: usize,
    pub attempt: usize,
    pub within_limit: bool,
}

/// POST /api/admin/images (multipart, field `file`)
///
/// Returns the compressed data URL for the client to put into a menu item or logo.
pub async fn upload_image(
    _session: AdminSession,
    mut multipart: Multipart,
) -> Result<Json<UploadedImage>> {
    let mut bytes = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            bytes = Some(field.bytes().await?.to_vec());
            break;
        }
    }
    let bytes = bytes.ok_or_else(|| Error::validation("Missing 'file' field"))?;

    let compressed = compress_image_async(bytes).await?;
    let size_kb = compressed.size_kb();
    if size_kb > MAX_UPLOAD_KB {
        return Err(Error::validation("Imagen aún muy grande"));
    }
    info!(
        "Compressed upload to {size_kb}KB at ladder step {}",
        compressed.attempt
    );

    Ok(Json(UploadedImage {
        data_url: compressed.data_url,
        size_kb,
        attempt: compressed.attempt,
        within_limit: compressed.within_limit,
    }))
}
