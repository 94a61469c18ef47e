use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use otpgate_application::GateError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures of the gate itself, as opposed to refused codes.
#[derive(Debug, Error)]
pub enum GateApiError {
    #[error("Session state is unavailable")]
    SessionUnavailable,

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl IntoResponse for GateApiError {
    fn into_response(self) -> Response {
        let status_code = match self {
            GateApiError::SessionUnavailable => StatusCode::CONFLICT,
            GateApiError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status_code.is_server_error() {
            tracing::error!(error = %self, "OTP gate failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status_code, body).into_response()
    }
}

impl From<GateError> for GateApiError {
    fn from(error: GateError) -> Self {
        match error {
            GateError::SessionUnavailable => GateApiError::SessionUnavailable,
            other => GateApiError::UnexpectedError(other.to_string()),
        }
    }
}
