use crate::{error::AppError, response::ApiResponse, AppState};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use core_types::{Client, ClientInput};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Body of a create or update request. A missing field is a validation
/// error, not a body-parsing error.
#[derive(Debug, Deserialize)]
pub struct ClientPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub balance: Option<Value>,
}

impl ClientPayload {
    fn into_input(self) -> Result<ClientInput, AppError> {
        Ok(ClientInput::parse(self.name.as_deref(), self.balance.as_ref())?)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
}

/// # GET /api/clients
/// All clients, newest first.
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<Client>>, AppError> {
    let clients = state.store.list_clients().await?;
    Ok(ApiResponse::success(clients))
}

/// # GET /api/clients/:id
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<Client>, AppError> {
    let Path(id) = id?;
    let client = state.store.get_client(id).await?;
    Ok(ApiResponse::success(client))
}

/// # POST /api/clients
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClientPayload>, JsonRejection>,
) -> Result<ApiResponse<Client>, AppError> {
    let Json(payload) = payload?;
    let input = payload.into_input()?;

    let client = state.store.create_client(&input).await?;
    tracing::info!(client_id = client.id, "Client created.");
    Ok(ApiResponse::success(client))
}

/// # PUT /api/clients/:id
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ClientPayload>, JsonRejection>,
) -> Result<ApiResponse<Client>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let input = payload.into_input()?;

    let client = state.store.update_client(id, &input).await?;
    tracing::info!(client_id = id, "Client updated.");
    Ok(ApiResponse::success(client))
}

/// # DELETE /api/clients/:id
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<Value>, AppError> {
    let Path(id) = id?;

    state.store.delete_client(id).await?;
    tracing::info!(client_id = id, "Client deleted.");
    Ok(ApiResponse::success(json!({})))
}

/// # POST /api/login
/// JSON counterpart of the login form. Sets the session cookie on success.
pub async fn api_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), AppError> {
    let Json(login) = payload?;
    let (jar, username) = state.login(jar, &login.username, &login.password)?;
    Ok((jar, ApiResponse::success(LoginResponse { username })))
}

/// # POST /api/logout
/// Always succeeds, whether or not a session existed.
pub async fn api_logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<Value>) {
    (state.logout(jar), ApiResponse::success(json!({})))
}
