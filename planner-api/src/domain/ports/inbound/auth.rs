use async_trait::async_trait;

use crate::domain::{
    models::{AuthGrant, Identity, Registration, User, UserId},
    AuthError,
};

/// Inbound port for authentication.
#[async_trait]
pub trait AuthService: Send + Sync + 'static {
    /// Check credentials and issue a session token.
    ///
    /// Unknown usernames and wrong passwords fail identically with
    /// [`AuthError::InvalidCredentials`].
    async fn login(&self, username: &str, password: &str) -> Result<AuthGrant, AuthError>;

    /// Validate a session token and return the identity it carries.
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;

    /// Create a user and issue a session token for it.
    async fn register(&self, registration: Registration) -> Result<AuthGrant, AuthError>;

    /// Load the current state of a user, for `GET /auth/profile`.
    async fn profile(&self, user_id: &UserId) -> Result<User, AuthError>;
}
