//! Admin routes for the about, contact and logo documents.

use super::{AppState, auth::AdminSession, log_refresh};
use crate::{
    core::site::{self, AboutData, ContactData, LogoData},
    errors::Result,
};
use axum::{Json, extract::State};
use std::sync::Arc;

/// PUT /api/admin/site/about
pub async fn save_about(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(about): Json<AboutData>,
) -> Result<Json<AboutData>> {
    site::save_about(&state.db, &about).await?;
    log_refresh("about", state.live.refresh_about(&state.db).await);
    Ok(Json(about))
}

/// PUT /api/admin/site/contact
pub async fn save_contact(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(contact): Json<ContactData>,
) -> Result<Json<ContactData>> {
    site::save_contact(&state.db, &contact).await?;
    log_refresh("contact", state.live.refresh_contact(&state.db).await);
    Ok(Json(contact))
}

/// PUT /api/admin/site/logo
///
/// The manifest cache follows the logo feed, so icons update with this write.
pub async fn save_logo(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(logo): Json<LogoData>,
) -> Result<Json<LogoData>> {
    site::save_logo(&state.db, &logo).await?;
    log_refresh("logo", state.live.refresh_logo(&state.db).await);
    Ok(Json(logo))
}
