use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// How long a passed OTP check stays valid without activity.
///
/// Configured as a number of minutes where `0` means the check never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum Lifetime {
    #[default]
    Eternal,
    Minutes(NonZeroU32),
}

impl From<u32> for Lifetime {
    fn from(minutes: u32) -> Self {
        NonZeroU32::new(minutes).map_or(Lifetime::Eternal, Lifetime::Minutes)
    }
}

impl From<Lifetime> for u32 {
    fn from(lifetime: Lifetime) -> Self {
        match lifetime {
            Lifetime::Eternal => 0,
            Lifetime::Minutes(minutes) => minutes.get(),
        }
    }
}

/// User-facing messages, keyed the way the HTTP layer looks them up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMessages {
    pub wrong_otp: String,
    pub cannot_be_empty: String,
    pub unknown: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            wrong_otp: "The 'One Time Password' typed was wrong.".to_string(),
            cannot_be_empty: "One Time Password cannot be empty.".to_string(),
            unknown: "An unknown error has occurred. Please try again.".to_string(),
        }
    }
}

/// Gate configuration. Read-only to the core; resolved once per request by
/// the HTTP layer and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Master switch. When off every request is allowed.
    pub enabled: bool,
    pub lifetime: Lifetime,
    /// Refresh the last activity time on every allowed request.
    pub keep_alive: bool,
    /// Adjacent time-steps tolerated by the verifier.
    pub window: u32,
    /// Refuse codes from a time-step at or before the last accepted one.
    pub forbid_old_passwords: bool,
    /// Never read or write session state (API clients).
    pub stateless: bool,
    /// Name of the request field carrying the code.
    pub otp_input: String,
    /// Namespace for session entries.
    pub session_var: String,
    pub error_messages: ErrorMessages,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lifetime: Lifetime::Eternal,
            keep_alive: true,
            window: 1,
            forbid_old_passwords: false,
            stateless: false,
            otp_input: "one_time_password".to_string(),
            session_var: "google2fa".to_string(),
            error_messages: ErrorMessages::default(),
        }
    }
}

impl GateConfig {
    /// Same configuration with session state switched off.
    pub fn into_stateless(mut self) -> Self {
        self.stateless = true;
        self
    }
}
