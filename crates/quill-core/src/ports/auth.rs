//! Authentication ports: password hashing and token issue/verify.

use uuid::Uuid;

/// Claims embedded in a session token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    pub issued_at: i64,
    pub exp: i64,
}

/// Token service - mints and verifies signed identity tokens.
///
/// Verification is pure: it trusts the signature and never consults the
/// store, so there is no server-side revocation.
pub trait TokenService: Send + Sync {
    /// Issue a signed, time-bound token for a logged-in user.
    fn issue(&self, user_id: Uuid, username: &str) -> Result<String, AuthError>;

    /// Verify a presented token and return the embedded claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Token lifetime in seconds, for cookie max-age.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plaintext password with a fresh random salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No credential on request")]
    MissingToken,

    #[error("Token expired")]
    Expired,

    #[error("Token signature mismatch")]
    BadSignature,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Hashing error: {0}")]
    Hashing(String),
}
