//! The authentication gate.
//!
//! A caller is either [`AuthState::Anonymous`] or [`AuthState::Authenticated`].
//! Logging in with the configured account creates a server-side [`Session`]
//! whose random id travels in a cookie; logging out deletes it. The gate
//! middlewares resolve the state before any protected handler runs, so the
//! client store is never reached by an anonymous caller.

use crate::{error::AppError, AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use configuration::AuthSettings;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Decides whether a username/password pair is a known account.
pub trait CredentialVerifier: Send + Sync {
    /// Returns the account name when the pair is accepted.
    ///
    /// Implementations must not reveal which of the two fields was wrong.
    fn verify(&self, username: &str, password: &str) -> Option<String>;
}

/// Exactly one account, taken from the settings.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(&settings.username, &settings.password)
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> Option<String> {
        let user_ok = constant_time_eq(username, &self.username);
        let pass_ok = constant_time_eq(password, &self.password);
        (user_ok & pass_ok).then(|| self.username.clone())
    }
}

/// Byte comparison that does not stop at the first mismatch. Only a length
/// difference returns early.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(Session),
}

/// Live sessions, shared by every request.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, Session>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365)),
        }
    }

    /// Opens a session for an authenticated account and returns its id.
    pub fn create(&self, username: String) -> Uuid {
        let id = Uuid::new_v4();
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.sessions.insert(id, Session { username, expires_at });
        id
    }

    /// Looks a session up. Unknown and expired ids are both anonymous; an
    /// expired one is dropped on the way.
    pub fn resolve(&self, id: Uuid) -> AuthState {
        let session = match self.sessions.get(&id) {
            Some(entry) => entry.value().clone(),
            None => return AuthState::Anonymous,
        };
        if session.expires_at <= Utc::now() {
            self.sessions.remove(&id);
            return AuthState::Anonymous;
        }
        AuthState::Authenticated(session)
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Drops every expired session and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        let now = Utc::now();
        self.sessions.retain(|_, session| session.expires_at > now);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// How the session cookie is named and flagged.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

impl CookieSettings {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            name: settings.cookie_name.clone(),
            secure: settings.secure_cookie,
        }
    }

    /// The id carried by the request's session cookie, if it parses.
    pub fn session_id(&self, jar: &CookieJar) -> Option<Uuid> {
        jar.get(&self.name)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    }

    pub fn session_cookie(&self, id: Uuid) -> Cookie<'static> {
        Cookie::build((self.name.clone(), id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), "")).path("/").build()
    }
}

impl AppState {
    /// Resolves the caller's authentication state from its cookies.
    pub fn auth_state(&self, jar: &CookieJar) -> AuthState {
        match self.cookie.session_id(jar) {
            Some(id) => self.sessions.resolve(id),
            None => AuthState::Anonymous,
        }
    }

    /// Checks a credential pair and, on success, opens a session.
    ///
    /// Any session the jar already carried is closed first so a login never
    /// leaves a second live session behind.
    pub fn login(
        &self,
        jar: CookieJar,
        username: &str,
        password: &str,
    ) -> Result<(CookieJar, String), AppError> {
        let Some(account) = self.credentials.verify(username, password) else {
            tracing::warn!("Rejected login attempt.");
            return Err(AppError::InvalidCredentials);
        };

        if let Some(previous) = self.cookie.session_id(&jar) {
            self.sessions.remove(previous);
        }
        let id = self.sessions.create(account.clone());
        tracing::info!(username = %account, "User logged in.");

        Ok((jar.add(self.cookie.session_cookie(id)), account))
    }

    /// Ends the caller's session, if any, and clears the cookie.
    pub fn logout(&self, jar: CookieJar) -> CookieJar {
        if let Some(id) = self.cookie.session_id(&jar) {
            if self.sessions.remove(id) {
                tracing::info!("User logged out.");
            }
        }
        jar.remove(self.cookie.removal_cookie())
    }
}

/// Gate for the JSON API: anonymous callers get a 401 envelope.
pub async fn require_api_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match state.auth_state(&jar) {
        AuthState::Authenticated(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        AuthState::Anonymous => {
            tracing::warn!(path = %request.uri().path(), "Rejected unauthenticated API request.");
            AppError::Unauthorized.into_response()
        }
    }
}

/// Gate for page routes: anonymous callers are sent to the login page.
pub async fn require_page_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match state.auth_state(&jar) {
        AuthState::Authenticated(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        AuthState::Anonymous => Redirect::to("/login").into_response(),
    }
}
