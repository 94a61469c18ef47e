use super::{replay_key::ReplayKey, session_snapshot::SessionSnapshot};

/// Why a submitted code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The code did not match, or matched a forbidden (replayed) time-step.
    WrongCode,
    /// The enrolled secret could not be used. A data problem on the
    /// client's side, rendered as 4xx.
    SecretInvalid,
}

/// The gate's verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Allow,
    /// No code was submitted; ask for one.
    Challenge,
    /// A submission was made without a code.
    RejectEmpty,
    RejectInvalid(RejectReason),
}

impl GateOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateOutcome::Allow)
    }

    /// Status code an HTTP adapter should answer with when the request is
    /// not let through.
    pub fn status_code(&self) -> u16 {
        match self {
            GateOutcome::Allow | GateOutcome::Challenge => 200,
            GateOutcome::RejectEmpty => 400,
            GateOutcome::RejectInvalid(_) => 422,
        }
    }
}

/// The change to session state the caller should persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Unchanged,
    Put(SessionSnapshot),
    Clear,
}

/// Result of an evaluation: the verdict plus the proposed session mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub outcome: GateOutcome,
    pub update: SessionUpdate,
    /// Replay key of the code verified by this request, if one was.
    pub accepted_key: Option<ReplayKey>,
}

impl GateDecision {
    pub fn new(outcome: GateOutcome, update: SessionUpdate) -> Self {
        Self {
            outcome,
            update,
            accepted_key: None,
        }
    }

    pub fn with_accepted_key(mut self, key: ReplayKey) -> Self {
        self.accepted_key = Some(key);
        self
    }

    pub fn allow() -> Self {
        Self::new(GateOutcome::Allow, SessionUpdate::Unchanged)
    }

    /// The snapshot that will be in effect once the update is applied to
    /// `current`.
    pub fn resulting_snapshot(&self, current: &SessionSnapshot) -> SessionSnapshot {
        match &self.update {
            SessionUpdate::Unchanged => current.clone(),
            SessionUpdate::Put(snapshot) => snapshot.clone(),
            SessionUpdate::Clear => SessionSnapshot::default(),
        }
    }
}
