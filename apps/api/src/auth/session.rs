//! In-memory sessions keyed by a random token carried in the `session` cookie.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{ApiError, AppError};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone)]
struct Session {
    username: String,
    display_name: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::hours(ttl_hours.max(1)),
        }
    }

    /// Starts a session and returns its token.
    pub async fn create(&self, username: &str, display_name: &str) -> String {
        let token = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                display_name: display_name.to_string(),
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// The signed-in user for `token`; expired sessions are dropped.
    pub async fn get(&self, token: &str) -> Option<CurrentUser> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(s) if s.expires_at > now => {
                    return Some(CurrentUser {
                        username: s.username.clone(),
                        display_name: s.display_name.clone(),
                    })
                }
                None => return None,
                Some(_) => {}
            }
        }
        self.sessions.write().await.remove(token);
        None
    }

    pub async fn remove(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// The signed-in user. Page handlers take it as an extractor; anonymous requests are
/// redirected to `/login`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub username: String,
    pub display_name: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        state
            .sessions
            .get(&token)
            .await
            .ok_or(AppError::Unauthorized)
    }
}

/// [`CurrentUser`] for JSON routes: anonymous requests get a 401 JSON body.
#[derive(Debug, Clone)]
pub struct ApiUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for ApiUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        CurrentUser::from_request_parts(parts, state)
            .await
            .map(ApiUser)
            .map_err(ApiError)
    }
}
