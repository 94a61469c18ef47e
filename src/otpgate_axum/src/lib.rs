//! Axum integration for the otpgate one-time-password gate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  otpgate_core: HTTP trait definitions    │
//! └──────────────┬───────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────────────┐
//! │  otpgate_axum: Axum implementations      │
//! │  - AxumRequest / AxumResponseBuilder     │
//! │  - OtpGateLayer (session or stateless)   │
//! │  - logout route                          │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use otpgate_axum::{GateState, OtpGateLayer, routes};
//!
//! let app = Router::new()
//!     .route("/billing", get(billing))
//!     .layer(OtpGateLayer::new(state.clone()))
//!     .route("/otp/logout", post(routes::logout::<P, S, C, V, E>))
//!     .with_state(state);
//! ```

pub mod adapters;
pub mod body;
pub mod layer;
pub mod otp_input;
pub mod principal;
pub mod routes;
pub mod state;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export for convenience
pub use adapters::{AxumRequest, AxumResponseBuilder, response_builder};
pub use layer::{GateMode, OtpGateLayer, OtpGateService};
pub use principal::ExtensionPrincipalProvider;
pub use routes::GateApiError;
pub use state::{DefaultGateState, GateState};
pub use trace::with_trace_layer;
