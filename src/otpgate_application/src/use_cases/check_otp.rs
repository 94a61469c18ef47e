use otpgate_core::{
    Clock, EventSink, GateConfig, GateDecision, OtpInput, OtpSecret, OtpVerifier, Principal,
    PrincipalProvider, ReplayKey, SessionKey, SessionSnapshot, SessionStore, SessionUpdate,
};

use crate::{
    error::GateError,
    gate_engine::{GateEngine, GateInput},
};

/// Per-request data the HTTP layer extracted for the gate.
#[derive(Debug, Clone)]
pub struct CheckOtpRequest<'a> {
    /// Session the gate state is attached to. Not needed when stateless.
    pub session_id: Option<&'a str>,
    pub otp: OtpInput,
    /// Replay key supplied out of band by a stateless client.
    pub replay_key: Option<ReplayKey>,
}

/// Check OTP use case - decides whether a request may pass the gate and
/// persists the resulting session state.
pub struct CheckOtpUseCase<P, S, C, V, E> {
    principals: P,
    sessions: S,
    clock: C,
    engine: GateEngine<V, E>,
}

impl<P, S, C, V, E> CheckOtpUseCase<P, S, C, V, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    V: OtpVerifier,
    E: EventSink,
{
    pub fn new(principals: P, sessions: S, clock: C, engine: GateEngine<V, E>) -> Self {
        Self {
            principals,
            sessions,
            clock,
            engine,
        }
    }

    /// Execute the check OTP use case
    ///
    /// # Arguments
    /// * `parts` - Request parts the principal is resolved from
    /// * `request` - Session id, OTP input and optional replay key
    /// * `config` - Gate configuration for this request
    ///
    /// # Returns
    /// The gate decision. Its session update has already been applied.
    #[tracing::instrument(name = "CheckOtpUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        parts: &P::RequestParts,
        request: CheckOtpRequest<'_>,
        config: &GateConfig,
    ) -> Result<GateDecision, GateError> {
        if !config.enabled {
            return Ok(GateDecision::allow());
        }

        let principal = self.principals.current_principal(parts).await;
        let secret = match &principal {
            Some(principal) => self.principals.secret_for(principal).await?,
            None => None,
        };

        // Session state only matters for an enrolled principal on a stateful gate
        let session_key = match (&principal, &secret, config.stateless) {
            (Some(_), Some(_), false) => Some(
                request
                    .session_id
                    .map(|id| SessionKey::new(config.session_var.as_str(), id))
                    .ok_or(GateError::SessionUnavailable)?,
            ),
            _ => None,
        };

        let snapshot = match &session_key {
            Some(key) => self.sessions.get(key).await?,
            None => SessionSnapshot::default(),
        };

        let decision = self.engine.evaluate(
            GateInput {
                principal: principal.as_ref(),
                secret: secret.as_ref(),
                snapshot: &snapshot,
                otp: &request.otp,
                external_replay_key: request.replay_key,
            },
            config,
            self.clock.now(),
        );

        if let Some(key) = &session_key {
            self.apply(key, &decision.update).await?;
        }

        tracing::debug!(outcome = ?decision.outcome, "Gate evaluated");
        Ok(decision)
    }

    /// Whether the principal has enrolled a second factor.
    pub async fn is_activated(&self, principal: &Principal) -> Result<bool, GateError> {
        let secret: Option<OtpSecret> = self.principals.secret_for(principal).await?;
        Ok(secret.is_some())
    }

    async fn apply(&self, key: &SessionKey, update: &SessionUpdate) -> Result<(), GateError> {
        match update {
            SessionUpdate::Unchanged => {}
            SessionUpdate::Put(snapshot) => self.sessions.put(key, snapshot.clone()).await?,
            SessionUpdate::Clear => self.sessions.clear(key).await?,
        }
        Ok(())
    }
}
