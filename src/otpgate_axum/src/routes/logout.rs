//! Axum-specific logout route.

use axum::{
    extract::{Request, State},
    http::StatusCode,
};
use otpgate_core::{
    Clock, EventSink, GateRequest, OtpVerifier, Principal, PrincipalProvider, SessionStore,
};

use crate::{adapters::AxumRequest, routes::GateApiError, state::GateState};

/// Forget that the caller's session passed the OTP check.
///
/// Mount it next to the host's own logout, or call
/// [`LogoutUseCase`](otpgate_application::LogoutUseCase) from there.
///
/// ```ignore
/// let app = Router::new()
///     .route("/otp/logout", post(logout::<P, S, C, V, E>))
///     .with_state(state);
/// ```
#[tracing::instrument(name = "Logout", skip_all)]
pub async fn logout<P, S, C, V, E>(
    State(state): State<GateState<P, S, C, V, E>>,
    request: Request,
) -> Result<StatusCode, GateApiError>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    V: OtpVerifier,
    E: EventSink,
{
    let config = state.config();
    let principal = request.extensions().get::<Principal>().cloned();
    let session_id = AxumRequest(request)
        .cookie(state.cookie_name());

    state
        .logout()
        .execute(principal.as_ref(), session_id.as_deref(), &config)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
