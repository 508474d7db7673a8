//! Manifest and offline worker routes.

use super::AppState;
use crate::{
    config::store::StoreConfig,
    core::{
        manifest::{WebManifest, build_manifest},
        offline::render_service_worker,
        site::LogoData,
    },
    errors::{Error, Result},
    live::{Feed, LiveHub, Subscription},
};
use axum::{
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// The manifest for the current logo, rebuilt whenever the logo feed changes.
pub struct ManifestCache {
    manifest: Arc<Feed<WebManifest>>,
    _logo_subscription: Subscription,
}

async fn build_off_thread(config: Arc<StoreConfig>, logo: Arc<LogoData>) -> Result<WebManifest> {
    tokio::task::spawn_blocking(move || build_manifest(&config, &logo))
        .await
        .map_err(|e| Error::Image {
            message: format!("Manifest worker failed: {e}"),
        })
}

impl ManifestCache {
    /// Builds the manifest from the current logo and keeps it in sync.
    ///
    /// Builds run on the blocking pool. When several logo changes overlap, only the
    /// build for the newest one is published.
    pub async fn start(live: &LiveHub, config: Arc<StoreConfig>) -> Result<Self> {
        let seed = live.logo.current();
        let initial = build_off_thread(Arc::clone(&config), Arc::clone(&seed)).await?;
        let manifest = Arc::new(Feed::new(initial));
        let generation = Arc::new(Mutex::new(0_u64));

        let target = Arc::clone(&manifest);
        let subscription = live.logo.subscribe(move |logo| {
            // The first call hands back the logo the seed was built from
            if Arc::ptr_eq(&logo, &seed) {
                return;
            }
            let ticket = {
                let mut latest = generation.lock().unwrap_or_else(PoisonError::into_inner);
                *latest += 1;
                *latest
            };
            debug!("Rebuilding manifest for logo mode {:?}", logo.mode);

            let config = Arc::clone(&config);
            let target = Arc::clone(&target);
            let generation = Arc::clone(&generation);
            drop(tokio::task::spawn_blocking(move || {
                let rebuilt = build_manifest(&config, &logo);
                let latest = generation.lock().unwrap_or_else(PoisonError::into_inner);
                if *latest == ticket {
                    target.publish(rebuilt);
                } else {
                    debug!("Dropping manifest built for a superseded logo");
                }
            }));
        });

        Ok(Self {
            manifest,
            _logo_subscription: subscription,
        })
    }

    #[must_use]
    pub fn current(&self) -> Arc<WebManifest> {
        self.manifest.current()
    }
}

/// GET /manifest.webmanifest
pub async fn manifest(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = serde_json::to_string(state.manifest.current().as_ref()).unwrap_or_default();
    (
        [
            (CONTENT_TYPE, "application/manifest+json"),
            (CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
}

/// GET /sw.js
pub async fn service_worker(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (CACHE_CONTROL, "no-cache"),
        ],
        render_service_worker(&state.config.pwa),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::site::LogoMode, test_utils::setup_test_db};
    use std::time::Duration;

    #[tokio::test]
    async fn test_manifest_follows_logo_changes() -> Result<()> {
        let db = setup_test_db().await?;
        let config = Arc::new(StoreConfig::default());
        let live = LiveHub::load(&db, Arc::clone(&config)).await?;
        let cache = ManifestCache::start(&live, Arc::clone(&config)).await?;

        let mut watcher = cache.manifest.watch();
        assert_eq!(cache.current().icons.len(), 2);

        live.logo.publish(LogoData {
            mode: LogoMode::Text,
            letter: "Q".to_string(),
            ..LogoData::default()
        });
        tokio::time::timeout(Duration::from_secs(1), watcher.changed())
            .await
            .map_err(|e| Error::validation(e.to_string()))?
            .map_err(|e| Error::validation(e.to_string()))?;

        let icon = &cache.current().icons[0].src;
        assert!(icon.starts_with("data:image/svg+xml;base64,"));
        Ok(())
    }

    #[tokio::test]
    async fn test_start_builds_once() -> Result<()> {
        let db = setup_test_db().await?;
        let config = Arc::new(StoreConfig::default());
        let live = LiveHub::load(&db, Arc::clone(&config)).await?;
        let cache = ManifestCache::start(&live, Arc::clone(&config)).await?;

        let watcher = cache.manifest.watch();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!watcher.has_changed().unwrap_or(true));
        Ok(())
    }

    #[tokio::test]
    async fn test_newest_logo_wins() -> Result<()> {
        let db = setup_test_db().await?;
        let config = Arc::new(StoreConfig::default());
        let live = LiveHub::load(&db, Arc::clone(&config)).await?;
        let cache = ManifestCache::start(&live, Arc::clone(&config)).await?;

        for letter in ["Q", "K"] {
            live.logo.publish(LogoData {
                mode: LogoMode::Text,
                letter: letter.to_string(),
                ..LogoData::default()
            });
            tokio::task::yield_now().await;
        }

        let expected = build_manifest(&config, &live.logo.current());
        let mut settled = false;
        for _ in 0..50 {
            if *cache.current() == expected {
                settled = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(settled);

        // No late build for "Q" replaces it
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*cache.current(), expected);
        Ok(())
    }
}
