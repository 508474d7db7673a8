//! Live snapshots of the stored documents.
//!
//! ```text
//! write path (core::*)
//!       │ refresh_<feed>(db)
//!       ▼
//! LiveHub
//!   ├── menu / orders / categories / about / contact / logo : Feed<T>
//!   │     └── watch::Sender<Arc<T>>  (latest snapshot only)
//!   │           │
//!   │           ▼
//!   └── Feed::subscribe(callback) / Feed::watch()  (WebSocket bridge, manifest cache)
//! ```
//!
//! A feed always holds a complete immutable snapshot. Subscribers see the current
//! snapshot immediately and then every later one; if several writes land before a
//! subscriber wakes up it only sees the newest.
//!
//! Refreshes of one feed are serialized: the re-read and the publish happen under the
//! feed's refresh lock, so a later read is never overwritten by an earlier one.

use crate::{
    config::store::StoreConfig,
    core::{category, menu, order, site},
    entities::{MenuItemModel, OrderModel},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::{future::Future, sync::Arc};
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
};
use tracing::{debug, instrument};

/// One live document or collection.
pub struct Feed<T> {
    tx: watch::Sender<Arc<T>>,
    refresh_lock: Mutex<()>,
}

impl<T: Send + Sync + 'static> Feed<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self {
            tx,
            refresh_lock: Mutex::new(()),
        }
    }

    /// The latest snapshot.
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.tx.borrow())
    }

    /// Replaces the snapshot and wakes every subscriber.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(Arc::new(value));
    }

    /// Runs `load` and publishes its result while holding the refresh lock.
    ///
    /// `load` only starts once every earlier refresh of this feed has published.
    /// A failed load publishes nothing.
    pub async fn refresh_with<F, Fut>(&self, load: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _guard = self.refresh_lock.lock().await;
        let value = load().await?;
        self.publish(value);
        Ok(())
    }

    /// Raw receiver, marked as having seen the current snapshot.
    pub fn watch(&self) -> watch::Receiver<Arc<T>> {
        self.tx.subscribe()
    }

    /// Calls `callback` with the current snapshot right away, then after every
    /// publish, until the returned [`Subscription`] is dropped or unsubscribed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<F>(&self, mut callback: F) -> Subscription
    where
        F: FnMut(Arc<T>) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let initial = Arc::clone(&rx.borrow_and_update());
        callback(initial);

        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let snapshot = Arc::clone(&rx.borrow_and_update());
                callback(snapshot);
            }
            debug!("Feed closed, ending subscription");
        });
        Subscription { handle }
    }
}

/// Handle to a running subscription; dropping it stops the callbacks.
#[must_use = "dropping a Subscription stops it immediately"]
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Every live feed the storefront and admin panel listen to.
pub struct LiveHub {
    pub menu: Feed<Vec<MenuItemModel>>,
    pub orders: Feed<Vec<OrderModel>>,
    pub categories: Feed<Vec<String>>,
    pub about: Feed<site::AboutData>,
    pub contact: Feed<site::ContactData>,
    pub logo: Feed<site::LogoData>,
    config: Arc<StoreConfig>,
}

impl LiveHub {
    /// Builds the hub and primes every feed from the store.
    #[instrument(skip_all)]
    pub async fn load(db: &DatabaseConnection, config: Arc<StoreConfig>) -> Result<Self> {
        let hub = Self {
            menu: Feed::new(Vec::new()),
            orders: Feed::new(Vec::new()),
            categories: Feed::new(config.store.default_categories.clone()),
            about: Feed::new(config.content.about.clone()),
            contact: Feed::new(config.content.contact.clone()),
            logo: Feed::new(config.content.logo.clone()),
            config,
        };
        hub.refresh_all(db).await?;
        Ok(hub)
    }

    pub async fn refresh_all(&self, db: &DatabaseConnection) -> Result<()> {
        self.refresh_menu(db).await?;
        self.refresh_orders(db).await?;
        self.refresh_categories(db).await?;
        self.refresh_about(db).await?;
        self.refresh_contact(db).await?;
        self.refresh_logo(db).await
    }

    pub async fn refresh_menu(&self, db: &DatabaseConnection) -> Result<()> {
        self.menu
            .refresh_with(|| menu::get_all_menu_items(db))
            .await
    }

    /// Orders newest first.
    pub async fn refresh_orders(&self, db: &DatabaseConnection) -> Result<()> {
        self.orders
            .refresh_with(|| order::list_orders(db, None))
            .await
    }

    pub async fn refresh_categories(&self, db: &DatabaseConnection) -> Result<()> {
        let defaults = &self.config.store.default_categories;
        self.categories
            .refresh_with(|| category::load_categories(db, defaults))
            .await
    }

    pub async fn refresh_about(&self, db: &DatabaseConnection) -> Result<()> {
        self.about
            .refresh_with(|| site::load_about(db, &self.config.content.about))
            .await
    }

    pub async fn refresh_contact(&self, db: &DatabaseConnection) -> Result<()> {
        self.contact
            .refresh_with(|| site::load_contact(db, &self.config.content.contact))
            .await
    }

    pub async fn refresh_logo(&self, db: &DatabaseConnection) -> Result<()> {
        self.logo
            .refresh_with(|| site::load_logo(db, &self.config.content.logo))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::database::{create_connection, create_tables},
        test_utils::{create_test_menu_item, setup_test_db},
    };
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Option<T> {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn test_subscribe_fires_immediately_then_on_change() {
        let feed = Feed::new(1_u32);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = feed.subscribe(move |value| {
            let _ = tx.send(*value);
        });

        assert_eq!(rx.try_recv().ok(), Some(1));

        feed.publish(2);
        assert_eq!(next(&mut rx).await, Some(2));
        feed.publish(3);
        assert_eq!(next(&mut rx).await, Some(3));
        assert!(subscription.is_active());

        subscription.unsubscribe();
        feed.publish(4);
        let after = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(!matches!(after, Ok(Some(_))));
    }

    #[tokio::test]
    async fn test_independent_subscribers() {
        let feed = Feed::new(String::from("a"));
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let first = feed.subscribe(move |v| {
            let _ = tx1.send(v.to_string());
        });
        let second = feed.subscribe(move |v| {
            let _ = tx2.send(v.to_string());
        });

        drop(first);
        feed.publish(String::from("b"));

        assert_eq!(next(&mut rx2).await.as_deref(), Some("a"));
        assert_eq!(next(&mut rx2).await.as_deref(), Some("b"));
        assert_eq!(rx1.try_recv().ok().as_deref(), Some("a"));
        drop(second);
    }

    #[tokio::test]
    async fn test_refresh_started_later_publishes_last() -> Result<()> {
        let feed = Feed::new(0_u32);

        let slow = feed.refresh_with(|| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(1)
        });
        let fast = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            feed.refresh_with(|| async { Ok(2) }).await
        };
        let (slow, fast) = tokio::join!(slow, fast);
        slow?;
        fast?;

        assert_eq!(*feed.current(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let feed = Feed::new(7_u32);
        let result = feed
            .refresh_with(|| async { Err(crate::errors::Error::validation("boom")) })
            .await;
        assert!(result.is_err());
        assert_eq!(*feed.current(), 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_end_on_stored_rows() -> Result<()> {
        let path = std::env::temp_dir().join(format!("storefront-{}.sqlite", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let db = create_connection(&url).await?;
        create_tables(&db).await?;
        let hub = Arc::new(LiveHub::load(&db, Arc::new(StoreConfig::default())).await?);
        // `DatabaseConnection` is not `Clone` when sea-orm's `mock` feature is on.
        let db = Arc::new(db);

        let writers: Vec<_> = (0..12)
            .map(|i| {
                let db = Arc::clone(&db);
                let hub = Arc::clone(&hub);
                tokio::spawn(async move {
                    create_test_menu_item(&db, &format!("Item {i}"), "Burgers", "5.00").await?;
                    hub.refresh_menu(&db).await
                })
            })
            .collect();
        for writer in writers {
            writer
                .await
                .map_err(|e| crate::errors::Error::validation(e.to_string()))??;
        }

        let mut published: Vec<String> = hub.menu.current().iter().map(|m| m.id.clone()).collect();
        let mut stored: Vec<String> = menu::get_all_menu_items(&db)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        published.sort();
        stored.sort();
        assert_eq!(stored.len(), 12);
        assert_eq!(published, stored);

        if let Ok(db) = Arc::try_unwrap(db) {
            db.close().await?;
        }
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[tokio::test]
    async fn test_hub_loads_and_refreshes() -> Result<()> {
        let db = setup_test_db().await?;
        let hub = LiveHub::load(&db, Arc::new(StoreConfig::default())).await?;

        assert!(hub.menu.current().is_empty());
        assert_eq!(hub.categories.current().len(), 3);
        assert_eq!(hub.logo.current().letter, "Z");

        let mut watcher = hub.menu.watch();
        create_test_menu_item(&db, "Classic", "Burgers", "5.00").await?;
        hub.refresh_menu(&db).await?;

        assert!(watcher.has_changed().unwrap_or(false));
        assert_eq!(watcher.borrow_and_update().len(), 1);
        assert_eq!(hub.menu.current()[0].name, "Classic");
        Ok(())
    }
}
