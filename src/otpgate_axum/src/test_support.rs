//! Test doubles for the layer and route tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use otpgate_core::{
    Clock, EventSink, GateEvent, GateEventKind, OtpVerifier, ReplayKey, VerificationError,
    VerificationRequest,
};
use secrecy::ExposeSecret;

pub const GOOD_CODE: &str = "123456";

/// Accepts [`GOOD_CODE`] only; the key is the 30 second step.
pub struct StaticVerifier;

impl OtpVerifier for StaticVerifier {
    fn verify(&self, request: &VerificationRequest) -> Result<ReplayKey, VerificationError> {
        if request.code.as_ref().expose_secret() != GOOD_CODE {
            return Err(VerificationError::CodeMismatch);
        }
        let key = ReplayKey::new(request.timestamp.timestamp() as u64 / 30);
        if request.forbidden_key.is_some_and(|forbidden| key <= forbidden) {
            return Err(VerificationError::ReplayForbidden);
        }
        Ok(key)
    }
}

#[derive(Clone)]
pub struct TestClock(DateTime<Utc>);

impl Default for TestClock {
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone, Default)]
pub struct RecordingEvents(Arc<Mutex<Vec<GateEventKind>>>);

impl RecordingEvents {
    pub fn kinds(&self) -> Vec<GateEventKind> {
        self.0.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEvents {
    fn emit(&self, event: GateEvent) {
        self.0.lock().unwrap().push(event.kind);
    }
}
