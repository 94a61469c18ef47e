use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    gate_event::GateEvent,
    otp_secret::OtpSecret,
    principal::Principal,
    replay_key::ReplayKey,
    verification::{VerificationError, VerificationRequest},
};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Checks a submitted code against a secret.
///
/// Implementations must return the same [`ReplayKey`] for the same code at
/// the same time-step, and must fail when the computed key is at or before
/// `forbidden_key`, even if the digits are otherwise correct.
pub trait OtpVerifier: Send + Sync {
    fn verify(&self, request: &VerificationRequest) -> Result<ReplayKey, VerificationError>;
}

/// Fire-and-forget event broadcast. Nothing the sink does feeds back into a
/// gate decision.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: GateEvent);
}

#[derive(Debug, Error)]
pub enum PrincipalProviderError {
    #[error("Failed to load secret: {0}")]
    SecretLookup(String),
}

/// Resolves who a request belongs to and what secret they enrolled.
#[async_trait]
pub trait PrincipalProvider: Send + Sync {
    /// The request parts this provider reads the principal from.
    ///
    /// Typically `http::request::Parts`.
    type RequestParts: Send + Sync;

    async fn current_principal(&self, parts: &Self::RequestParts) -> Option<Principal>;

    async fn secret_for(
        &self,
        principal: &Principal,
    ) -> Result<Option<OtpSecret>, PrincipalProviderError>;
}
