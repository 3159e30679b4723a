//! Outgoing ports for credential handling, implemented in `infra::security`.

use uuid::Uuid;

use crate::contract::model::{TokenPair, User};

/// One-way password hashing with constant-time verification.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> anyhow::Result<String>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a valid encoding.
    fn verify(&self, password: &str, hash: &str) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// What a verified token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Signs and verifies access/refresh tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<TokenPair, TokenError>;
    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenSubject, TokenError>;
}
