pub mod domain;
pub mod http_abstraction;
pub mod policies;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    gate_config::{ErrorMessages, GateConfig, Lifetime},
    gate_event::{GateEvent, GateEventKind},
    gate_outcome::{GateDecision, GateOutcome, RejectReason, SessionUpdate},
    one_time_password::{OneTimePassword, OtpInput},
    otp_secret::{OtpSecret, OtpSecretError},
    principal::Principal,
    replay_key::ReplayKey,
    session_snapshot::{SessionKey, SessionSnapshot},
    verification::{VerificationError, VerificationRequest},
};

pub use ports::{
    repositories::{SecretStore, SecretStoreError, SessionStore, SessionStoreError},
    services::{Clock, EventSink, OtpVerifier, PrincipalProvider, PrincipalProviderError},
};

pub use policies::{expiry_policy::ExpiryPolicy, replay_guard::ReplayGuard};

pub use http_abstraction::{GateRequest, GateResponseBuilder, GateResponseHelpers};
