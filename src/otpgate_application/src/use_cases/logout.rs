use otpgate_core::{
    EventSink, GateConfig, GateEvent, GateEventKind, Principal, SessionKey, SessionStore,
};

use crate::error::GateError;

/// Logout use case - forgets that the session passed the OTP check
pub struct LogoutUseCase<S, E>
where
    S: SessionStore,
    E: EventSink,
{
    sessions: S,
    events: E,
}

impl<S, E> LogoutUseCase<S, E>
where
    S: SessionStore,
    E: EventSink,
{
    pub fn new(sessions: S, events: E) -> Self {
        Self { sessions, events }
    }

    /// Execute the logout use case
    ///
    /// # Arguments
    /// * `principal` - The principal logging out, if still known
    /// * `session_id` - The session whose gate state is cleared
    /// * `config` - Gate configuration for this request
    ///
    /// # Returns
    /// Ok(()) on success, `GateError::SessionUnavailable` when the gate
    /// runs stateless or there is no session.
    #[tracing::instrument(name = "LogoutUseCase::execute", skip(self, session_id, config))]
    pub async fn execute(
        &self,
        principal: Option<&Principal>,
        session_id: Option<&str>,
        config: &GateConfig,
    ) -> Result<(), GateError> {
        if config.stateless {
            return Err(GateError::SessionUnavailable);
        }
        let session_id = session_id.ok_or(GateError::SessionUnavailable)?;

        self.sessions
            .clear(&SessionKey::new(config.session_var.as_str(), session_id))
            .await?;

        if let Some(principal) = principal {
            self.events
                .emit(GateEvent::new(GateEventKind::LoggedOut, principal.clone()));
        }

        Ok(())
    }
}
