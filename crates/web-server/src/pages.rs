//! Browser-facing routes: login, logout and the two protected pages.
//!
//! The real page templates are served by the front end; these handlers only
//! decide who may see what and where to send them.

use crate::{
    auth::AuthState,
    error::AppError,
    AppState,
};
use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

const NO_STORE: &str = "no-cache, no-store, must-revalidate";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn login_page_html(error: Option<&str>) -> Html<String> {
    let error = error
        .map(|message| format!("<p class=\"error\">{message}</p>"))
        .unwrap_or_default();
    Html(format!(
        "<!doctype html><html><head><title>Login</title></head><body>\
         <h1>Login</h1>{error}\
         <form method=\"post\" action=\"/login\">\
         <input name=\"username\" placeholder=\"Username\" autocomplete=\"username\">\
         <input name=\"password\" type=\"password\" placeholder=\"Password\" autocomplete=\"current-password\">\
         <button type=\"submit\">Sign in</button>\
         </form></body></html>"
    ))
}

fn protected_page(title: &str) -> Response {
    (
        [(header::CACHE_CONTROL, NO_STORE)],
        Html(format!(
            "<!doctype html><html><head><title>{title}</title></head>\
             <body><div id=\"app\" data-page=\"{title}\"></div></body></html>"
        )),
    )
        .into_response()
}

/// # GET /
pub async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> Redirect {
    match state.auth_state(&jar) {
        AuthState::Authenticated(_) => Redirect::to("/dashboard"),
        AuthState::Anonymous => Redirect::to("/login"),
    }
}

/// # GET /login
pub async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    match state.auth_state(&jar) {
        AuthState::Authenticated(_) => Redirect::to("/dashboard").into_response(),
        AuthState::Anonymous => login_page_html(None).into_response(),
    }
}

/// # POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    if let AuthState::Authenticated(_) = state.auth_state(&jar) {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let Form(form) = form?;

    match state.login(jar, &form.username, &form.password) {
        Ok((jar, _)) => Ok((jar, Redirect::to("/dashboard")).into_response()),
        Err(AppError::InvalidCredentials) => Ok((
            StatusCode::UNAUTHORIZED,
            login_page_html(Some("Invalid username or password")),
        )
            .into_response()),
        Err(other) => Err(other),
    }
}

/// # GET /logout
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    (state.logout(jar), Redirect::to("/"))
}

/// # GET /dashboard
pub async fn dashboard() -> Response {
    protected_page("Dashboard")
}

/// # GET /clients
pub async fn clients_page() -> Response {
    protected_page("Clients")
}
