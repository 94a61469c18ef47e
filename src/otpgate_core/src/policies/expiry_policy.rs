use chrono::{DateTime, Utc};

use crate::domain::{
    gate_config::{GateConfig, Lifetime},
    session_snapshot::SessionSnapshot,
};

/// Decides whether an earlier OTP pass still holds.
pub struct ExpiryPolicy;

impl ExpiryPolicy {
    /// A pass holds while the whole minutes since last activity do not
    /// exceed the configured lifetime. An eternal lifetime always holds.
    ///
    /// A passed snapshot without a last activity time is treated as expired.
    pub fn is_still_valid(snapshot: &SessionSnapshot, config: &GateConfig, now: DateTime<Utc>) -> bool {
        if !snapshot.passed {
            return false;
        }

        let minutes = match config.lifetime {
            Lifetime::Eternal => return true,
            Lifetime::Minutes(minutes) => u64::from(minutes.get()),
        };

        match snapshot.last_activity_at {
            Some(last_activity) => minutes_between(last_activity, now) <= minutes,
            None => false,
        }
    }
}

impl ExpiryPolicy {
    /// How long a store may keep a pass before it can no longer be valid.
    ///
    /// A pass holds through the last second of its final whole minute, so
    /// this is one minute past the lifetime. `None` for an eternal lifetime.
    pub fn retention(lifetime: Lifetime) -> Option<std::time::Duration> {
        match lifetime {
            Lifetime::Eternal => None,
            Lifetime::Minutes(minutes) => Some(std::time::Duration::from_secs(
                (u64::from(minutes.get()) + 1) * 60,
            )),
        }
    }
}

/// Whole minutes from `from` to `to`; a `from` in the future counts as zero.
fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_minutes()).unwrap_or(0)
}
