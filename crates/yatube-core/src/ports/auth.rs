//! Session tokens and password hashing.

/// What a session token says about its bearer.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<String>,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Issues and checks the signed session tokens kept in the session cookie.
pub trait TokenService: Send + Sync {
    fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        roles: Vec<String>,
    ) -> Result<String, AuthError>;

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens, also used as the cookie max-age.
    fn expiration_seconds(&self) -> i64;
}

/// One-way password hashing for stored accounts.
pub trait PasswordService: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` for a wrong password; errors only when hashing itself breaks.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no session")]
    MissingSession,

    #[error("session expired")]
    Expired,

    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}
