//! HTTP interface - storefront API, admin API, live feed and static files.
//!
//! Handlers are thin: they validate input through the `core` functions, then ask the
//! [`LiveHub`] to republish whatever they changed.

/// Admin login and the `AdminSession` extractor
pub mod auth;
/// `IntoResponse` for the crate error
pub mod error;
/// Live feed WebSocket
pub mod live;
/// Admin menu, category and upload routes
pub mod menu;
/// Admin order routes
pub mod orders;
/// Manifest and offline worker routes
pub mod pwa;
/// Admin site content routes
pub mod site;
/// Public storefront routes
pub mod storefront;

use crate::{
    config::{admin::AdminCredential, store::StoreConfig},
    errors::Result,
    live::LiveHub,
};
use auth::SessionStore;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
};
use pwa::ManifestCache;
use sea_orm::DatabaseConnection;
use std::{path::Path, sync::Arc};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Raw uploads may be much larger than the compressed result.
const UPLOAD_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Shared state handed to every handler.
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<StoreConfig>,
    pub live: LiveHub,
    pub sessions: SessionStore,
    pub admin: AdminCredential,
    pub manifest: ManifestCache,
}

impl AppState {
    /// Loads the live feeds and starts the manifest cache.
    pub async fn new(
        db: DatabaseConnection,
        config: StoreConfig,
        admin: AdminCredential,
    ) -> Result<Arc<Self>> {
        let config = Arc::new(config);
        let live = LiveHub::load(&db, Arc::clone(&config)).await?;
        let manifest = ManifestCache::start(&live, Arc::clone(&config)).await?;
        Ok(Arc::new(Self {
            db,
            config,
            live,
            sessions: SessionStore::new(),
            admin,
            manifest,
        }))
    }
}

/// Logs a failed feed refresh. The write it follows has already succeeded.
pub(crate) fn log_refresh(feed: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!("Failed to refresh {feed} feed after write: {e}");
    }
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/menu", get(storefront::list_menu))
        .route("/api/categories", get(storefront::list_categories))
        .route("/api/site/about", get(storefront::about))
        .route("/api/site/contact", get(storefront::contact))
        .route("/api/site/logo", get(storefront::logo))
        .route("/api/orders", post(storefront::checkout))
        .route("/api/live/ws", get(live::handle_live_ws))
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/login", post(auth::login))
        .route("/api/admin/logout", post(auth::logout))
        .route("/api/admin/orders", get(orders::list))
        .route(
            "/api/admin/orders/{id}",
            get(orders::get).delete(orders::remove),
        )
        .route("/api/admin/orders/{id}/advance", post(orders::advance))
        .route("/api/admin/orders/{id}/cancel", post(orders::cancel))
        .route("/api/admin/orders/{id}/status", put(orders::update_status))
        .route("/api/admin/orders/{id}/whatsapp", get(orders::whatsapp))
        .route("/api/admin/menu", get(menu::list).post(menu::create))
        .route(
            "/api/admin/menu/{id}",
            patch(menu::update).delete(menu::remove),
        )
        .route(
            "/api/admin/categories",
            post(menu::add_category).put(menu::replace_categories),
        )
        .route("/api/admin/categories/{name}", delete(menu::remove_category))
        .route(
            "/api/admin/images",
            post(menu::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/admin/site/about", put(site::save_about))
        .route("/api/admin/site/contact", put(site::save_contact))
        .route("/api/admin/site/logo", put(site::save_logo))
}

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = Path::new(&state.config.store.static_dir);
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .merge(api_routes())
        .merge(admin_routes())
        .route("/manifest.webmanifest", get(pwa::manifest))
        .route("/sw.js", get(pwa::service_worker))
        .fallback_service(spa)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `address` and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: Arc<AppState>, address: &str) -> Result<()> {
    let app = router(state);
    let listener = TcpListener::bind(address).await?;
    info!("Storefront listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
