//! Framework-agnostic rendering of gate outcomes.

use otpgate_core::{
    ErrorMessages, GateOutcome, GateRequest, GateResponseBuilder, GateResponseHelpers,
    RejectReason,
};

/// User-facing message for an outcome.
///
/// A challenge carries the generic message; its status is 200 and the page
/// itself is the host's business.
pub fn message_for<'a>(outcome: &GateOutcome, messages: &'a ErrorMessages) -> &'a str {
    match outcome {
        GateOutcome::RejectEmpty => &messages.cannot_be_empty,
        GateOutcome::RejectInvalid(RejectReason::WrongCode) => &messages.wrong_otp,
        GateOutcome::RejectInvalid(RejectReason::SecretInvalid)
        | GateOutcome::Challenge
        | GateOutcome::Allow => &messages.unknown,
    }
}

/// Render a non-allow outcome.
///
/// Returns `None` for [`GateOutcome::Allow`]: the request continues to the
/// protected handler. JSON clients get `{"message": ...}`; everybody else
/// gets plain text, with an empty body for a challenge.
///
/// # Example
///
/// ```ignore
/// let config = handle.load();
/// let request = AxumRequest(request);
/// if let Some(response) = render_outcome(
///     &request,
///     &decision.outcome,
///     &config.error_messages,
///     response_builder(),
/// ) {
///     return response;
/// }
/// ```
pub fn render_outcome<R, B>(
    request: &R,
    outcome: &GateOutcome,
    messages: &ErrorMessages,
    builder: B,
) -> Option<B::Response>
where
    R: GateRequest,
    B: GateResponseBuilder,
{
    if outcome.is_allowed() {
        return None;
    }

    let status = outcome.status_code();
    let message = message_for(outcome, messages);

    let builder = builder.header("cache-control", "no-store");
    let response = if request.expects_json() {
        builder.json_message(status, message)
    } else if matches!(outcome, GateOutcome::Challenge) {
        builder.text_message(status, "")
    } else {
        builder.text_message(status, message)
    };
    Some(response)
}
