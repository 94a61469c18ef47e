//! Test doubles shared by the use case tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use otpgate_core::{
    Clock, EventSink, GateEvent, GateEventKind, OtpSecret, OtpVerifier, Principal,
    PrincipalProvider, PrincipalProviderError, ReplayKey, SessionKey, SessionSnapshot,
    SessionStore, SessionStoreError, VerificationError, VerificationRequest,
};
use secrecy::ExposeSecret;

pub const GOOD_CODE: &str = "123456";
pub const BAD_SECRET: &str = "NOT-BASE32";

pub fn secret() -> OtpSecret {
    OtpSecret::from_optional(Some("JBSWY3DPEHPK3PXP".to_string())).unwrap()
}

/// Accepts [`GOOD_CODE`] at any time; the key is the 30 second step.
pub struct StepVerifier;

impl StepVerifier {
    pub fn key_at(at: DateTime<Utc>) -> ReplayKey {
        ReplayKey::new(at.timestamp().max(0) as u64 / 30)
    }
}

impl OtpVerifier for StepVerifier {
    fn verify(&self, request: &VerificationRequest) -> Result<ReplayKey, VerificationError> {
        if request.secret.as_ref().expose_secret() == BAD_SECRET {
            return Err(VerificationError::SecretInvalid("not base32".to_string()));
        }
        if request.code.as_ref().expose_secret() != GOOD_CODE {
            return Err(VerificationError::CodeMismatch);
        }
        let key = Self::key_at(request.timestamp);
        if request.forbidden_key.is_some_and(|forbidden| key <= forbidden) {
            return Err(VerificationError::ReplayForbidden);
        }
        Ok(key)
    }
}

#[derive(Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<GateEvent>>>,
}

impl RecordingEventSink {
    pub fn kinds(&self) -> Vec<GateEventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    pub fn principals(&self) -> Vec<Principal> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.principal.clone())
            .collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: GateEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Clone)]
pub struct FixedClock(pub Arc<Mutex<DateTime<Utc>>>);

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(now)))
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Clone, Default)]
pub struct MockSessionStore {
    pub entries: Arc<Mutex<HashMap<SessionKey, SessionSnapshot>>>,
    pub touched: Arc<Mutex<usize>>,
}

impl MockSessionStore {
    pub fn snapshot(&self, key: &SessionKey) -> Option<SessionSnapshot> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn access_count(&self) -> usize {
        *self.touched.lock().unwrap()
    }

    fn touch(&self) {
        *self.touched.lock().unwrap() += 1;
    }
}

#[async_trait::async_trait]
impl SessionStore for MockSessionStore {
    async fn get(&self, key: &SessionKey) -> Result<SessionSnapshot, SessionStoreError> {
        self.touch();
        Ok(self.snapshot(key).unwrap_or_default())
    }

    async fn put(
        &self,
        key: &SessionKey,
        snapshot: SessionSnapshot,
    ) -> Result<(), SessionStoreError> {
        self.touch();
        self.entries.lock().unwrap().insert(key.clone(), snapshot);
        Ok(())
    }

    async fn clear(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        self.touch();
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Request parts are just the principal name, if any.
#[derive(Clone, Default)]
pub struct MockPrincipalProvider {
    pub secrets: HashMap<Principal, OtpSecret>,
}

impl MockPrincipalProvider {
    pub fn with_secret(principal: &str) -> Self {
        Self::with_secrets(&[principal])
    }

    pub fn with_secrets(principals: &[&str]) -> Self {
        let secrets = principals
            .iter()
            .map(|principal| (Principal::new(*principal), secret()))
            .collect();
        Self { secrets }
    }
}

#[async_trait::async_trait]
impl PrincipalProvider for MockPrincipalProvider {
    type RequestParts = Option<String>;

    async fn current_principal(&self, parts: &Self::RequestParts) -> Option<Principal> {
        parts.as_deref().map(Principal::new)
    }

    async fn secret_for(
        &self,
        principal: &Principal,
    ) -> Result<Option<OtpSecret>, PrincipalProviderError> {
        Ok(self.secrets.get(principal).cloned())
    }
}
