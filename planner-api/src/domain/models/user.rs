use std::fmt;

use time::OffsetDateTime;

use super::UserId;
use crate::domain::AuthError;

#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("password_hash", &"[redacted]")
            .finish()
    }
}

/// Data for inserting a user. The password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("password_hash", &"[redacted]")
            .finish()
    }
}

/// Plain-text registration input, validated by the auth service.
#[derive(Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// The identity carried by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

/// A freshly issued session token.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of a successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub token: IssuedToken,
    pub user: User,
}

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_DISPLAY_NAME_LEN: usize = 100;

impl Registration {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            display_name: display_name.into(),
        }
    }

    /// Trim the username and display name and check the registration rules.
    ///
    /// The password is kept verbatim.
    pub fn normalized(self) -> Result<Registration, AuthError> {
        let username = self.username.trim().to_string();
        let display_name = self.display_name.trim().to_string();

        let username_len = username.chars().count();
        if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
            return Err(AuthError::Validation(format!(
                "username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
            )));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(AuthError::Validation(
                "username may only contain letters, digits, '_', '.' and '-'".into(),
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let display_len = display_name.chars().count();
        if display_len == 0 || display_len > MAX_DISPLAY_NAME_LEN {
            return Err(AuthError::Validation(format!(
                "display name must be between 1 and {MAX_DISPLAY_NAME_LEN} characters"
            )));
        }

        Ok(Registration {
            username,
            password: self.password,
            display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_trims_and_accepts_valid_input() {
        let registration = Registration::new(" alice.k ", "correct horse", " Alice ")
            .normalized()
            .unwrap();
        assert_eq!(registration.username, "alice.k");
        assert_eq!(registration.display_name, "Alice");
        assert_eq!(registration.password, "correct horse");
    }

    #[test]
    fn registration_rejects_bad_usernames_and_short_passwords() {
        for (username, password, display) in [
            ("al", "password1", "Al"),
            ("alice smith", "password1", "Alice"),
            ("alice", "short", "Alice"),
            ("alice", "password1", "   "),
        ] {
            let result = Registration::new(username, password, display).normalized();
            assert!(
                matches!(result, Err(AuthError::Validation(_))),
                "{username:?}/{password:?}/{display:?} should be rejected"
            );
        }
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let registration = Registration::new("alice", "hunter22", "Alice");
        let debug = format!("{registration:?}");
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("[redacted]"));
    }
}
