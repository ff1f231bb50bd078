use crate::domain::AuthError;

/// Outbound port for password hashing.
///
/// Implementations are CPU-bound; callers run them on a blocking thread.
pub trait PasswordHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Returns `Ok(false)` on mismatch; errors are reserved for unusable hashes.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}
