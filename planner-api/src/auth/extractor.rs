use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{app_state::AppState, domain::models::UserId, routes::ApiError};

/// A custom Axum extractor that resolves the `Authorization: Bearer` token to
/// the authenticated user. Returns 401 Unauthorized when the header is
/// missing or the token does not verify.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::unauthorized("missing bearer token"))?;

        let identity = state.auth_service.verify(bearer.token()).await?;

        Ok(AuthUser {
            id: identity.user_id,
            username: identity.username,
        })
    }
}
