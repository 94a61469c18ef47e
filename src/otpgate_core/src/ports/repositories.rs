use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    otp_secret::OtpSecret,
    principal::Principal,
    session_snapshot::{SessionKey, SessionSnapshot},
};

// SessionStore port trait and errors
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Corrupted session entry: {0}")]
    CorruptedEntry(String),
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for SessionStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::CorruptedEntry(_), Self::CorruptedEntry(_))
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Storage for per-session gate state.
///
/// A missing entry reads as an empty snapshot. Read-then-write is not atomic:
/// two concurrent requests on one session can both see the same snapshot.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &SessionKey) -> Result<SessionSnapshot, SessionStoreError>;
    async fn put(&self, key: &SessionKey, snapshot: SessionSnapshot)
    -> Result<(), SessionStoreError>;
    async fn clear(&self, key: &SessionKey) -> Result<(), SessionStoreError>;
}

// SecretStore port trait and errors
#[derive(Debug, Error)]
pub enum SecretStoreError {
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

/// Lookup of enrolled OTP secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn secret_for(&self, principal: &Principal)
    -> Result<Option<OtpSecret>, SecretStoreError>;
}
