use otpgate_core::{EventSink, GateEvent, GateEventKind};

/// Writes every gate event to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: GateEvent) {
        let principal = event.principal.as_str();
        match event.kind {
            GateEventKind::LoginFailed | GateEventKind::EmptyOneTimePasswordReceived => {
                tracing::warn!(event = event.kind.as_str(), principal, "OTP gate event")
            }
            _ => tracing::info!(event = event.kind.as_str(), principal, "OTP gate event"),
        }
    }
}
