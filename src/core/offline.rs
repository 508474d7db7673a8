//! Offline worker script served at `/sw.js`.
//!
//! The cache name carries the version: changing `pwa.cache_name` makes the next
//! activation drop every older cache.

use crate::config::store::PwaSection;

/// Requests under this prefix always go to the network.
pub const API_PREFIX: &str = "/api/";

const WORKER_TEMPLATE: &str = r#"const CACHE_NAME = __CACHE_NAME__;
const STATIC_ASSETS = __STATIC_ASSETS__;
const API_PREFIX = __API_PREFIX__;

self.addEventListener("install", (event) => {
  event.waitUntil(
    caches.open(CACHE_NAME).then((cache) => cache.addAll(STATIC_ASSETS))
  );
  self.skipWaiting();
});

self.addEventListener("activate", (event) => {
  event.waitUntil(
    caches.keys().then((keys) =>
      Promise.all(keys.filter((k) => k !== CACHE_NAME).map((k) => caches.delete(k)))
    )
  );
  self.clients.claim();
});

self.addEventListener("fetch", (event) => {
  const { request } = event;
  const url = new URL(request.url);

  if (
    request.method !== "GET" ||
    url.origin !== self.location.origin ||
    url.pathname.startsWith(API_PREFIX)
  ) {
    return;
  }

  if (request.mode === "navigate") {
    event.respondWith(fetch(request).catch(() => caches.match("/index.html")));
    return;
  }

  event.respondWith(
    caches.match(request).then((cached) => {
      if (cached) return cached;
      return fetch(request)
        .then((response) => {
          if (response && response.status === 200 && response.type === "basic") {
            const clone = response.clone();
            caches.open(CACHE_NAME).then((cache) => cache.put(request, clone));
          }
          return response;
        })
        .catch(() => caches.match("/index.html"));
    })
  );
});
"#;

/// Renders the worker script for the configured cache version and asset list.
#[must_use]
pub fn render_service_worker(pwa: &PwaSection) -> String {
    // serde_json string/array output is valid JavaScript literal syntax
    let cache_name = serde_json::Value::from(pwa.cache_name.as_str()).to_string();
    let assets = serde_json::Value::from(pwa.static_assets.clone()).to_string();
    let api_prefix = serde_json::Value::from(API_PREFIX).to_string();

    WORKER_TEMPLATE
        .replace("__CACHE_NAME__", &cache_name)
        .replace("__STATIC_ASSETS__", &assets)
        .replace("__API_PREFIX__", &api_prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_uses_configured_cache_name() {
        let script = render_service_worker(&PwaSection::default());
        assert!(script.starts_with("const CACHE_NAME = \"zequi-smash-v1\";"));
        assert!(script.contains(
            r#"const STATIC_ASSETS = ["/","/index.html","/manifest.json","/icon-192.svg","/icon-512.svg"];"#
        ));
        assert!(!script.contains("__"));
    }

    #[test]
    fn test_bumping_version_changes_only_the_constant() {
        let v1 = render_service_worker(&PwaSection::default());
        let v2 = render_service_worker(&PwaSection {
            cache_name: "zequi-smash-v2".to_string(),
            ..PwaSection::default()
        });
        assert_ne!(v1, v2);
        assert_eq!(v1.replace("zequi-smash-v1", "zequi-smash-v2"), v2);
    }

    #[test]
    fn test_worker_strategies() {
        let script = render_service_worker(&PwaSection::default());
        assert!(script.contains("keys.filter((k) => k !== CACHE_NAME)"));
        assert!(script.contains(r#"caches.match("/index.html")"#));
        assert!(script.contains("url.pathname.startsWith(API_PREFIX)"));
        assert!(script.contains("const API_PREFIX = \"/api/\";"));
    }

    #[test]
    fn test_asset_names_are_escaped() {
        let script = render_service_worker(&PwaSection {
            static_assets: vec!["/a\"b.js".to_string()],
            ..PwaSection::default()
        });
        assert!(script.contains(r#"["/a\"b.js"]"#));
    }
}
