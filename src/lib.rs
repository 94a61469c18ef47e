//! # otpgate - one-time-password gate for axum services
//!
//! This is a facade crate that re-exports the public APIs of the gate's
//! component crates.
//!
//! ## Structure
//!
//! - **Core domain types**: `GateConfig`, `SessionSnapshot`, `GateOutcome`, etc.
//! - **Ports**: `SessionStore`, `SecretStore`, `PrincipalProvider`, `OtpVerifier`, ...
//! - **Use cases**: `CheckOtpUseCase`, `LoginUseCase`, `LogoutUseCase`
//! - **Adapters**: `TotpRsVerifier`, `HashMapSessionStore`, `RedisSessionStore`, settings
//! - **Axum**: `GateState`, `OtpGateLayer`, the logout route
//!
//! ## Usage
//!
//! ```ignore
//! let settings = otpgate::GateSettings::load()?;
//! let app = otpgate::router_with_gate(protected_routes, secrets, &settings)?;
//! ```

use axum::Router;

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use otpgate_core::*;
}

pub use otpgate_core::{
    ErrorMessages, GateConfig, GateDecision, GateEvent, GateEventKind, GateOutcome, Lifetime,
    OneTimePassword, OtpInput, OtpSecret, Principal, RejectReason, ReplayKey, SessionKey,
    SessionSnapshot, SessionUpdate,
};

// ============================================================================
// Ports
// ============================================================================

pub use otpgate_core::{
    Clock, EventSink, OtpVerifier, PrincipalProvider, PrincipalProviderError, SecretStore,
    SecretStoreError, SessionStore, SessionStoreError,
};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use otpgate_application::*;
}

pub use otpgate_application::{
    CheckOtpRequest, CheckOtpUseCase, GateEngine, GateError, LoginUseCase, LogoutUseCase,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Session and secret stores
    pub mod persistence {
        pub use otpgate_adapters::persistence::*;
    }

    /// Event sinks
    pub mod events {
        pub use otpgate_adapters::events::*;
    }

    /// Configuration
    pub mod config {
        pub use otpgate_adapters::config::*;
    }
}

pub use otpgate_adapters::{
    BroadcastEventSink, ConfigHandle, ConfiguredSessionStore, GateSettings, HashMapSecretStore,
    HashMapSessionStore, RedisSessionStore, SettingsError, SystemClock, TotpRsVerifier,
    TracingEventSink, init_tracing,
};

// ============================================================================
// Axum Integration
// ============================================================================

pub use otpgate_axum::{
    DefaultGateState, ExtensionPrincipalProvider, GateApiError, GateMode, GateState,
    OtpGateLayer, routes, with_trace_layer,
};

/// Put `protected` behind the gate with the stock adapters.
///
/// The session store follows `settings.session`. The host's authentication
/// layer must run before the gate and insert a [`Principal`] extension.
pub fn router_with_gate<St>(
    protected: Router,
    secrets: St,
    settings: &GateSettings,
) -> Result<Router, GateError>
where
    St: SecretStore + Clone + 'static,
{
    let sessions = ConfiguredSessionStore::connect(&settings.session, settings.gate.lifetime)?;
    let state = DefaultGateState::with_defaults(
        secrets,
        sessions,
        ConfigHandle::new(settings.gate.clone()),
    )
    .with_cookie_name(&settings.session.cookie_name);

    let layer = if settings.gate.stateless {
        OtpGateLayer::stateless(state)
    } else {
        OtpGateLayer::new(state)
    };
    Ok(protected.layer(layer))
}

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing the port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
