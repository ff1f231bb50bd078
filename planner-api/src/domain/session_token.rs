use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, OsRng},
    AeadCore, Aes256Gcm, Key, KeyInit,
};
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::domain::{
    models::{Identity, IssuedToken, UserId},
    AuthError,
};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i32,
    username: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenKeyError {
    #[error("token key is not valid base64")]
    Encoding,
    #[error("token key must be 32 bytes, got {0}")]
    Length(usize),
}

/// Seals and opens session tokens with AES-256-GCM.
///
/// A token is `base64url(nonce || ciphertext)` where the ciphertext holds the
/// JSON claims. The GCM tag authenticates the claims, so any modification or
/// a token sealed under a different key fails to open.
#[derive(Clone)]
pub struct SessionTokenCodec {
    cipher: Aes256Gcm,
    ttl: Duration,
}

impl SessionTokenCodec {
    pub fn new(key: &[u8; KEY_LEN], ttl: Duration) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key);
        Self {
            cipher: Aes256Gcm::new(key),
            ttl,
        }
    }

    pub fn from_base64_key(key_b64: &str, ttl: Duration) -> Result<Self, TokenKeyError> {
        let bytes = BASE64_STANDARD
            .decode(key_b64.trim())
            .map_err(|_| TokenKeyError::Encoding)?;
        let key: [u8; KEY_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TokenKeyError::Length(bytes.len()))?;
        Ok(Self::new(&key, ttl))
    }

    pub fn issue(&self, user_id: UserId, username: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, username, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        user_id: UserId,
        username: &str,
        now: OffsetDateTime,
    ) -> Result<IssuedToken, AuthError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: user_id.as_i32(),
            username: username.to_string(),
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };
        let plaintext =
            serde_json::to_vec(&claims).map_err(|e| AuthError::Crypto(e.to_string()))?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng); // 96-bits; unique per message
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|e| AuthError::Crypto(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(IssuedToken {
            token: BASE64_URL_SAFE_NO_PAD.encode(sealed),
            expires_at: OffsetDateTime::from_unix_timestamp(claims.exp).unwrap_or(expires_at),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Identity, AuthError> {
        let sealed = BASE64_URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| AuthError::MalformedToken)?;
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(AuthError::MalformedToken);
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = GenericArray::from_slice(nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| AuthError::InvalidSignature)?;

        let claims: Claims =
            serde_json::from_slice(&plaintext).map_err(|_| AuthError::MalformedToken)?;
        if claims.exp <= now.unix_timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(Identity {
            user_id: UserId::new(claims.sub),
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> SessionTokenCodec {
        SessionTokenCodec::new(&[7u8; KEY_LEN], Duration::hours(1))
    }

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let codec = codec();
        let issued = codec.issue(UserId::new(42), "alice").unwrap();

        let identity = codec.verify(&issued.token).unwrap();
        assert_eq!(identity.user_id, UserId::new(42));
        assert_eq!(identity.username, "alice");
        assert!(issued.expires_at > OffsetDateTime::now_utc());
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let issued_at = OffsetDateTime::now_utc() - Duration::hours(2);
        let issued = codec.issue_at(UserId::new(1), "alice", issued_at).unwrap();

        assert!(matches!(
            codec.verify(&issued.token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn tampered_token_fails_signature_check() {
        let codec = codec();
        let issued = codec.issue(UserId::new(1), "alice").unwrap();

        let mut bytes = BASE64_URL_SAFE_NO_PAD.decode(&issued.token).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = BASE64_URL_SAFE_NO_PAD.encode(bytes);

        assert!(matches!(
            codec.verify(&tampered),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn token_from_other_key_fails_signature_check() {
        let other = SessionTokenCodec::new(&[9u8; KEY_LEN], Duration::hours(1));
        let issued = other.issue(UserId::new(1), "alice").unwrap();

        assert!(matches!(
            codec().verify(&issued.token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        assert!(matches!(codec.verify("not a token!"), Err(AuthError::MalformedToken)));
        assert!(matches!(codec.verify("c2hvcnQ"), Err(AuthError::MalformedToken)));
        assert!(matches!(codec.verify(""), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn key_must_be_32_bytes() {
        let short = BASE64_STANDARD.encode([1u8; 16]);
        assert!(matches!(
            SessionTokenCodec::from_base64_key(&short, Duration::hours(1)),
            Err(TokenKeyError::Length(16))
        ));
        assert!(matches!(
            SessionTokenCodec::from_base64_key("***", Duration::hours(1)),
            Err(TokenKeyError::Encoding)
        ));

        let good = BASE64_STANDARD.encode([1u8; 32]);
        assert!(SessionTokenCodec::from_base64_key(&good, Duration::hours(1)).is_ok());
    }
}
