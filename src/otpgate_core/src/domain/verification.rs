use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{one_time_password::OneTimePassword, otp_secret::OtpSecret, replay_key::ReplayKey};

/// One verification attempt handed to an [`OtpVerifier`].
///
/// [`OtpVerifier`]: crate::ports::services::OtpVerifier
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub secret: OtpSecret,
    pub code: OneTimePassword,
    pub window: u32,
    /// Time-step key that must not be accepted again.
    pub forbidden_key: Option<ReplayKey>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid one time password")]
    CodeMismatch,
    #[error("One time password was already used")]
    ReplayForbidden,
    #[error("Invalid secret key: {0}")]
    SecretInvalid(String),
}
