use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{
    models::{AuthGrant, Identity, NewUser, Registration, User, UserId},
    ports::{
        inbound::AuthService,
        outbound::{PasswordHasher, UserRepository},
    },
    AuthError, RepositoryError, SessionTokenCodec,
};

/// Verified against when the username is unknown, so that path costs the
/// same as a wrong password.
const DUMMY_PASSWORD: &str = "planner-dummy-password";

pub struct AuthServiceImpl<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: SessionTokenCodec,
    allow_registration: bool,
    dummy_hash: String,
}

impl<U, H: PasswordHasher> AuthServiceImpl<U, H> {
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: SessionTokenCodec) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            users,
            hasher,
            tokens,
            allow_registration: true,
            dummy_hash,
        })
    }

    pub fn with_registration(mut self, allow: bool) -> Self {
        self.allow_registration = allow;
        self
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|err| AuthError::Crypto(format!("password verification task failed: {err}")))?
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| AuthError::Crypto(format!("password hashing task failed: {err}")))?
    }
}

#[async_trait]
impl<U: UserRepository, H: PasswordHasher> AuthService for AuthServiceImpl<U, H> {
    #[instrument(name = "auth_login", skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<AuthGrant, AuthError> {
        let Some(user) = self.users.get_by_username(username.trim()).await? else {
            // Same work as a real mismatch; the outcome is ignored.
            let _ = self.verify_password(password, &self.dummy_hash).await;
            tracing::debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.username)?;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(AuthGrant { token, user })
    }

    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let identity = self.tokens.verify(token)?;

        // A valid token for a removed user is no longer accepted.
        if self.users.get_user(&identity.user_id).await?.is_none() {
            return Err(AuthError::UnknownUser);
        }

        Ok(identity)
    }

    #[instrument(name = "auth_register", skip(self, registration), fields(username = %registration.username))]
    async fn register(&self, registration: Registration) -> Result<AuthGrant, AuthError> {
        if !self.allow_registration {
            return Err(AuthError::RegistrationDisabled);
        }

        let registration = registration.normalized()?;
        let password_hash = self.hash_password(&registration.password).await?;

        let new_user = NewUser {
            username: registration.username.clone(),
            password_hash,
            display_name: registration.display_name,
        };

        let user = self
            .users
            .create_user(&new_user)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken(registration.username),
                other => AuthError::Repository(other),
            })?;

        let token = self.tokens.issue(user.id, &user.username)?;
        tracing::info!(user_id = %user.id, "user registered");

        Ok(AuthGrant { token, user })
    }

    async fn profile(&self, user_id: &UserId) -> Result<User, AuthError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UnknownUser)
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::adapters::outbound::{crypto::Argon2PasswordHasher, memory::InMemoryUserRepository};

    fn service() -> (
        AuthServiceImpl<InMemoryUserRepository, Argon2PasswordHasher>,
        Arc<InMemoryUserRepository>,
    ) {
        let users = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(Argon2PasswordHasher::with_params(8, 1, 1).unwrap());
        let tokens = SessionTokenCodec::new(&[3u8; 32], Duration::hours(1));
        let service = AuthServiceImpl::new(Arc::clone(&users), hasher, tokens).unwrap();
        (service, users)
    }

    async fn register_alice(service: &impl AuthService) -> AuthGrant {
        service
            .register(Registration::new("alice", "correct horse", "Alice"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn login_with_correct_password_issues_verifiable_token() {
        let (service, _) = service();
        register_alice(&service).await;

        let grant = service.login("alice", "correct horse").await.unwrap();
        assert_eq!(grant.user.username, "alice");

        let identity = service.verify(&grant.token.token).await.unwrap();
        assert_eq!(identity.user_id, grant.user.id);
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_fail_identically() {
        let (service, _) = service();
        register_alice(&service).await;

        let wrong_password = service.login("alice", "wrong horse").await.unwrap_err();
        let unknown_user = service.login("mallory", "correct horse").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn login_is_deterministic() {
        let (service, _) = service();
        register_alice(&service).await;

        for _ in 0..3 {
            assert!(service.login("alice", "correct horse").await.is_ok());
            assert!(service.login("alice", "nope nope").await.is_err());
        }
    }

    #[tokio::test]
    async fn stored_hash_is_not_the_password() {
        let (service, users) = service();
        let grant = register_alice(&service).await;

        let stored = users.get_user(&grant.user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "correct horse");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (service, _) = service();
        register_alice(&service).await;

        let err = service
            .register(Registration::new("alice", "another password", "Alice 2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken(name) if name == "alice"));
    }

    #[tokio::test]
    async fn registration_can_be_disabled() {
        let (service, _) = service();
        let service = service.with_registration(false);

        let err = service
            .register(Registration::new("alice", "correct horse", "Alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RegistrationDisabled));
    }

    #[tokio::test]
    async fn token_for_removed_user_is_rejected() {
        let (service, users) = service();
        let grant = register_alice(&service).await;

        users.remove(&grant.user.id);
        assert!(matches!(
            service.verify(&grant.token.token).await,
            Err(AuthError::UnknownUser)
        ));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (service, _) = service();
        assert!(matches!(
            service.verify("garbage").await,
            Err(AuthError::MalformedToken)
        ));
    }

    #[tokio::test]
    async fn profile_returns_stored_user() {
        let (service, _) = service();
        let grant = register_alice(&service).await;

        let profile = service.profile(&grant.user.id).await.unwrap();
        assert_eq!(profile.display_name, "Alice");
        assert!(matches!(
            service.profile(&UserId::new(999)).await,
            Err(AuthError::UnknownUser)
        ));
    }
}
