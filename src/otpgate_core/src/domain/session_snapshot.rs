use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{principal::Principal, replay_key::ReplayKey};

/// Per-session second factor state, as held by a [`SessionStore`].
///
/// A pass belongs to the principal that earned it. The gate never persists
/// this itself; it reads a snapshot and proposes a replacement through
/// [`SessionUpdate`].
///
/// [`SessionStore`]: crate::ports::repositories::SessionStore
/// [`SessionUpdate`]: crate::domain::gate_outcome::SessionUpdate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub passed: bool,
    /// Who passed. A pass without an owner is never honoured.
    #[serde(default)]
    pub principal: Option<Principal>,
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_accepted_replay_key: Option<ReplayKey>,
}

impl SessionSnapshot {
    /// Snapshot of a session that `principal` just passed.
    pub fn passed_at(principal: &Principal, now: DateTime<Utc>) -> Self {
        Self {
            passed: true,
            principal: Some(principal.clone()),
            last_activity_at: Some(now),
            last_accepted_replay_key: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether this session holds a pass earned by `principal`.
    pub fn is_passed_by(&self, principal: &Principal) -> bool {
        self.passed && self.principal.as_ref() == Some(principal)
    }

    pub fn touched(mut self, now: DateTime<Utc>) -> Self {
        self.last_activity_at = Some(now);
        self
    }
}

/// Where a session's gate state lives in a [`SessionStore`].
///
/// The namespace comes from configuration so several gates (or several
/// applications) can share one store.
///
/// [`SessionStore`]: crate::ports::repositories::SessionStore
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    namespace: String,
    session_id: String,
}

impl SessionKey {
    pub fn new(namespace: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            session_id: session_id.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.session_id)
    }
}
