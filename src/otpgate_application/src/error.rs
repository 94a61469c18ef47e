use otpgate_core::{PrincipalProviderError, SessionStoreError};

/// Errors that escape a gate use case.
///
/// Wrong or empty codes are not errors; they come back as a
/// [`GateOutcome`](otpgate_core::GateOutcome).
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No usable gate configuration could be loaded.
    #[error("Gate configuration is missing: {0}")]
    ConfigMissing(String),
    #[error("Gate configuration is invalid: {0}")]
    InvalidConfig(String),
    /// Session state was needed while the gate runs stateless, or the
    /// request carries no session to attach state to.
    #[error("Session state is unavailable")]
    SessionUnavailable,
    #[error("Session store error: {0}")]
    SessionStoreError(#[from] SessionStoreError),
    #[error("Principal provider error: {0}")]
    PrincipalProviderError(#[from] PrincipalProviderError),
}
