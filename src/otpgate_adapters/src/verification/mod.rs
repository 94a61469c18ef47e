pub mod totp_rs_verifier;

pub use totp_rs_verifier::TotpRsVerifier;
