pub mod env {
    pub const ENV_PREFIX: &str = "OTPGATE";
    pub const ENV_SEPARATOR: &str = "__";
    pub const CONFIG_FILE_ENV_VAR: &str = "OTPGATE_CONFIG_FILE";
}

/// Base name of the optional configuration file (`otpgate.toml`, `.json`, `.yaml`).
pub const DEFAULT_CONFIG_FILE: &str = "otpgate";

pub const SESSION_COOKIE_NAME: &str = "otpgate_session";

/// Header a stateless client uses to hand back the last accepted replay key.
pub const REPLAY_KEY_HEADER: &str = "x-otp-replay-key";
