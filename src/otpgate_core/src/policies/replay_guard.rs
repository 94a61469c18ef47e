use crate::domain::{
    gate_config::GateConfig, replay_key::ReplayKey, session_snapshot::SessionSnapshot,
};

/// Keeps an accepted code from being used twice.
pub struct ReplayGuard;

impl ReplayGuard {
    /// The key the verifier must refuse, if replay protection is on.
    pub fn forbidden_key_for(snapshot: &SessionSnapshot, config: &GateConfig) -> Option<ReplayKey> {
        if config.forbid_old_passwords {
            snapshot.last_accepted_replay_key
        } else {
            None
        }
    }

    /// Same as [`forbidden_key_for`](Self::forbidden_key_for) for a key a
    /// stateless client keeps itself.
    pub fn forbidden_external_key(key: Option<ReplayKey>, config: &GateConfig) -> Option<ReplayKey> {
        key.filter(|_| config.forbid_old_passwords)
    }

    /// The key worth keeping after `accepted` passed, if replay protection
    /// is on.
    pub fn to_remember(accepted: ReplayKey, config: &GateConfig) -> Option<ReplayKey> {
        config.forbid_old_passwords.then_some(accepted)
    }

    /// Remembers a freshly accepted key on `snapshot` when replay protection
    /// is on; otherwise leaves the snapshot without one.
    pub fn record(snapshot: &mut SessionSnapshot, accepted: ReplayKey, config: &GateConfig) {
        snapshot.last_accepted_replay_key = Self::to_remember(accepted, config);
    }
}
