pub mod expiry_policy;
pub mod replay_guard;
