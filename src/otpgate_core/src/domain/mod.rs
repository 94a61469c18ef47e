pub mod gate_config;
pub mod gate_event;
pub mod gate_outcome;
pub mod one_time_password;
pub mod otp_secret;
pub mod principal;
pub mod replay_key;
pub mod session_snapshot;
pub mod verification;
