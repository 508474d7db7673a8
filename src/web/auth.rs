//! Admin login and session tokens.
//!
//! A successful login hands out an opaque UUID token kept in memory until logout or
//! restart. Admin routes take it as `Authorization: Bearer <token>`; the WebSocket
//! endpoint also accepts `?token=` because browsers cannot set headers there.

use super::AppState;
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{info, warn};

/// Live admin session tokens.
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: RwLock<HashSet<String>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and remembers a fresh token.
    pub fn issue(&self) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone());
        token
    }

    #[must_use]
    pub fn is_valid(&self, token: &str) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(token)
    }

    /// Forgets a token; returns whether it was known.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
    }
}

/// Proof that the request carries a valid admin token.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            Some(token) if state.sessions.is_valid(token) => Ok(Self {
                token: token.to_string(),
            }),
            _ => Err(Error::Unauthorized),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if !state.admin.verify(&request.password) {
        warn!("Rejected admin login attempt");
        return Err(Error::Unauthorized);
    }
    info!("Admin logged in");
    Ok(Json(LoginResponse {
        token: state.sessions.issue(),
    }))
}

/// POST /api/admin/logout
pub async fn logout(State(state): State<Arc<AppState>>, session: AdminSession) -> StatusCode {
    state.sessions.revoke(&session.token);
    StatusCode::NO_CONTENT
}
