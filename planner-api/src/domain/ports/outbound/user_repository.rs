use async_trait::async_trait;

use crate::domain::{
    models::{NewUser, User, UserId},
    RepositoryError,
};

/// Outbound port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Exact-match lookup used by login.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Insert a user. A duplicate username yields [`RepositoryError::Conflict`].
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError>;
}
