use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::{
    models::{NewUser, User, UserId},
    ports::outbound::UserRepository,
    RepositoryError,
};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, id: &UserId) {
        self.users.write().unwrap().retain(|u| u.id != *id);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().unwrap().iter().find(|u| u.id == *id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict("users_username_key".into()));
        }

        let now = OffsetDateTime::now_utc();
        let created = User {
            id: UserId::new(users.len() as i32 + 1),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            display_name: user.display_name.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }
}
