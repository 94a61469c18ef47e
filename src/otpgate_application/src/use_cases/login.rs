use otpgate_core::{
    Clock, EventSink, GateConfig, GateEvent, GateEventKind, Principal, PrincipalProvider,
    SessionKey, SessionSnapshot, SessionStore,
};

use crate::error::GateError;

/// Login use case - marks a session as having passed the OTP check without
/// a code, e.g. when the user came back through a remember-me token.
pub struct LoginUseCase<P, S, C, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    principals: P,
    sessions: S,
    clock: C,
    events: E,
}

impl<P, S, C, E> LoginUseCase<P, S, C, E>
where
    P: PrincipalProvider,
    S: SessionStore,
    C: Clock,
    E: EventSink,
{
    pub fn new(principals: P, sessions: S, clock: C, events: E) -> Self {
        Self {
            principals,
            sessions,
            clock,
            events,
        }
    }

    /// Execute the login use case
    ///
    /// # Returns
    /// `Ok(true)` when the session was marked as passed, `Ok(false)` when
    /// the principal has no enrolled secret and nothing was stored.
    #[tracing::instrument(name = "LoginUseCase::execute", skip(self, session_id, config))]
    pub async fn execute(
        &self,
        principal: &Principal,
        session_id: Option<&str>,
        config: &GateConfig,
    ) -> Result<bool, GateError> {
        if config.stateless {
            return Err(GateError::SessionUnavailable);
        }
        let session_id = session_id.ok_or(GateError::SessionUnavailable)?;

        if self.principals.secret_for(principal).await?.is_none() {
            tracing::debug!("2FA not activated for principal, nothing to log in");
            return Ok(false);
        }

        let key = SessionKey::new(config.session_var.as_str(), session_id);
        // The principal's own replay key is kept so a forced login cannot
        // reopen an old code
        let previous = self.sessions.get(&key).await?;
        let mut snapshot = SessionSnapshot::passed_at(principal, self.clock.now());
        if previous.principal.as_ref().is_none_or(|owner| owner == principal) {
            snapshot.last_accepted_replay_key = previous.last_accepted_replay_key;
        }
        self.sessions.put(&key, snapshot).await?;

        self.events
            .emit(GateEvent::new(GateEventKind::LoginSucceeded, principal.clone()));
        Ok(true)
    }
}
