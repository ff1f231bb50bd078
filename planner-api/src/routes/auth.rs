use std::fmt;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::{extract::ApiJson, ApiError};
use crate::{
    adapters::inbound::http::{AuthResponse, UserResponse},
    app_state::AppState,
    auth::AuthUser,
    domain::models::Registration,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/profile", get(profile))
}

#[derive(Deserialize)]
pub struct LoginPayload {
    username: String,
    password: String,
}

impl fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPayload")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    username: String,
    password: String,
    /// Defaults to the username.
    display_name: Option<String>,
}

impl fmt::Debug for RegisterPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterPayload")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[instrument(name = "login", skip(app_state))]
async fn login(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    let grant = app_state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(grant.into()))
}

#[instrument(name = "register", skip(app_state))]
async fn register(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let display_name = payload
        .display_name
        .unwrap_or_else(|| payload.username.clone());
    let registration = Registration::new(payload.username, payload.password, display_name);

    let grant = app_state.auth_service.register(registration).await?;

    Ok((StatusCode::CREATED, Json(grant.into())))
}

#[instrument(name = "profile", skip(app_state, user), fields(username = %user.username))]
async fn profile(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = app_state.auth_service.profile(&user.id).await?;

    Ok(Json(user.into()))
}
