//! Axum routes for gate operations the host exposes over HTTP.

pub mod error;
pub mod logout;

pub use error::{ErrorResponse, GateApiError};
pub use logout::logout;
