//! Live feed WebSocket
//!
//! GET /api/live/ws?feeds=menu,categories[&token=<admin token>]
//!
//! Protocol (server → client only):
//! - `{"type":"snapshot","feed":"<name>","data":...}` once per feed on connect and
//!   again after every change to that feed.
//!
//! The `orders` feed needs a valid admin token passed as `token`.

use super::{AppState, auth::SessionStore};
use crate::{
    errors::{Error, Result},
    live::LiveHub,
};
use axum::{
    body::Bytes,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

const OUTBOUND_BUFFER: usize = 64;
const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveFeed {
    Menu,
    Orders,
    Categories,
    About,
    Contact,
    Logo,
}

impl LiveFeed {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Orders => "orders",
            Self::Categories => "categories",
            Self::About => "about",
            Self::Contact => "contact",
            Self::Logo => "logo",
        }
    }

    #[must_use]
    pub const fn requires_admin(self) -> bool {
        matches!(self, Self::Orders)
    }
}

impl FromStr for LiveFeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "menu" => Ok(Self::Menu),
            "orders" => Ok(Self::Orders),
            "categories" => Ok(Self::Categories),
            "about" => Ok(Self::About),
            "contact" => Ok(Self::Contact),
            "logo" => Ok(Self::Logo),
            other => Err(Error::validation(format!("Unknown feed '{other}'"))),
        }
    }
}

/// Parses a comma separated feed list, dropping repeats.
pub fn parse_feeds(raw: &str) -> Result<Vec<LiveFeed>> {
    let mut feeds = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let feed = part.parse()?;
        if !feeds.contains(&feed) {
            feeds.push(feed);
        }
    }
    if feeds.is_empty() {
        return Err(Error::validation("Select at least one feed"));
    }
    Ok(feeds)
}

#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    pub feeds: String,
    pub token: Option<String>,
}

#[derive(Serialize)]
struct SnapshotMessage<'a, T> {
    #[serde(rename = "type")]
    kind: &'static str,
    feed: &'static str,
    data: &'a T,
}

/// Admin-only feeds need a live session token; public feeds need nothing.
pub fn authorize_feeds(
    sessions: &SessionStore,
    feeds: &[LiveFeed],
    token: Option<&str>,
) -> Result<()> {
    if !feeds.iter().any(|f| f.requires_admin()) {
        return Ok(());
    }
    match token {
        Some(token) if sessions.is_valid(token) => Ok(()),
        _ => Err(Error::Unauthorized),
    }
}

/// GET /api/live/ws
///
/// Feed selection and the token are checked before the upgrade headers.
pub async fn handle_live_ws(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LiveQuery>,
    ws: std::result::Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response> {
    let feeds = parse_feeds(&query.feeds)?;
    authorize_feeds(&state.sessions, &feeds, query.token.as_deref())?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            debug!("Live WS upgrade rejected: {rejection}");
            return Ok(rejection.into_response());
        }
    };
    Ok(ws.on_upgrade(move |socket| live_session(socket, state, feeds)))
}

fn forward<T>(
    feed: LiveFeed,
    mut rx: watch::Receiver<Arc<T>>,
    out: mpsc::Sender<String>,
) -> JoinHandle<()>
where
    T: Serialize + Send + Sync + 'static,
{
    tokio::spawn(async move {
        loop {
            let snapshot = Arc::clone(&rx.borrow_and_update());
            let message = SnapshotMessage {
                kind: "snapshot",
                feed: feed.name(),
                data: snapshot.as_ref(),
            };
            let Ok(text) = serde_json::to_string(&message) else {
                debug!("Failed to encode {} snapshot", feed.name());
                break;
            };
            if out.send(text).await.is_err() || rx.changed().await.is_err() {
                break;
            }
        }
    })
}

fn spawn_forwarder(hub: &LiveHub, feed: LiveFeed, out: mpsc::Sender<String>) -> JoinHandle<()> {
    match feed {
        LiveFeed::Menu => forward(feed, hub.menu.watch(), out),
        LiveFeed::Orders => forward(feed, hub.orders.watch(), out),
        LiveFeed::Categories => forward(feed, hub.categories.watch(), out),
        LiveFeed::About => forward(feed, hub.about.watch(), out),
        LiveFeed::Contact => forward(feed, hub.contact.watch(), out),
        LiveFeed::Logo => forward(feed, hub.logo.watch(), out),
    }
}

async fn live_session(socket: WebSocket, state: Arc<AppState>, feeds: Vec<LiveFeed>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);

    let forwarders: Vec<JoinHandle<()>> = feeds
        .iter()
        .map(|&feed| spawn_forwarder(&state.live, feed, tx.clone()))
        .collect();
    drop(tx);
    info!(feeds = ?feeds, "Live WS connected");

    let mut ping = tokio::time::interval(PING_INTERVAL);
    ping.tick().await;

    loop {
        tokio::select! {
            _ = ping.tick() => {
                if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }

            outgoing = rx.recv() => {
                let Some(text) = outgoing else { break };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }

            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    for handle in forwarders {
        handle.abort();
    }
    info!("Live WS disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feeds() -> Result<()> {
        assert_eq!(
            parse_feeds("menu, categories,menu")?,
            vec![LiveFeed::Menu, LiveFeed::Categories]
        );
        assert!(parse_feeds("").is_err());
        assert!(parse_feeds("menu,secrets").is_err());
        Ok(())
    }

    #[test]
    fn test_only_orders_need_admin() {
        assert!(LiveFeed::Orders.requires_admin());
        assert!(!LiveFeed::Menu.requires_admin());
        assert!(!LiveFeed::Logo.requires_admin());
    }

    #[test]
    fn test_authorize_feeds() {
        let sessions = SessionStore::new();
        let admin_feeds = [LiveFeed::Menu, LiveFeed::Orders];

        assert!(matches!(
            authorize_feeds(&sessions, &admin_feeds, None),
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            authorize_feeds(&sessions, &admin_feeds, Some("forged")),
            Err(Error::Unauthorized)
        ));

        let token = sessions.issue();
        assert!(authorize_feeds(&sessions, &admin_feeds, Some(&token)).is_ok());

        assert!(sessions.revoke(&token));
        assert!(matches!(
            authorize_feeds(&sessions, &admin_feeds, Some(&token)),
            Err(Error::Unauthorized)
        ));

        assert!(authorize_feeds(&sessions, &[LiveFeed::Menu, LiveFeed::Logo], None).is_ok());
    }

    #[tokio::test]
    async fn test_forwarder_sends_snapshot_then_changes() -> Result<()> {
        let feed = crate::live::Feed::new(vec!["Burgers".to_string()]);
        let (tx, mut rx) = mpsc::channel(4);
        let handle = forward(LiveFeed::Categories, feed.watch(), tx);

        let first: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap_or_default())?;
        assert_eq!(first["type"], "snapshot");
        assert_eq!(first["feed"], "categories");
        assert_eq!(first["data"][0], "Burgers");

        feed.publish(vec!["Combos".to_string()]);
        let second: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap_or_default())?;
        assert_eq!(second["data"][0], "Combos");

        handle.abort();
        Ok(())
    }
}
