//! TOTP verification on top of the `totp-rs` crate.

use chrono::{DateTime, Utc};
use otpgate_core::{
    OtpSecret, OtpSecretError, OtpVerifier, ReplayKey, VerificationError, VerificationRequest,
};
use secrecy::ExposeSecret;
use totp_rs::{Algorithm, Secret, TOTP};

/// RFC 6238 verifier. The replay key of an accepted code is its time-step
/// counter, so later steps always compare greater.
#[derive(Debug, Clone, Copy)]
pub struct TotpRsVerifier {
    algorithm: Algorithm,
    digits: usize,
    step: u64,
}

impl Default for TotpRsVerifier {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::SHA1,
            digits: 6,
            step: 30,
        }
    }
}

impl TotpRsVerifier {
    pub fn new(algorithm: Algorithm, digits: usize, step: u64) -> Self {
        Self {
            algorithm,
            digits,
            step,
        }
    }

    /// Fresh random base32 secret for enrolment.
    pub fn generate_secret() -> Result<OtpSecret, OtpSecretError> {
        let encoded = Secret::generate_secret().to_encoded().to_string();
        OtpSecret::try_from(secrecy::Secret::new(encoded))
    }

    /// Code for the given secret at `at`.
    pub fn generate(
        &self,
        secret: &OtpSecret,
        at: DateTime<Utc>,
    ) -> Result<String, VerificationError> {
        let totp = self.totp(secret)?;
        Ok(totp.generate(unix_seconds(at)))
    }

    fn totp(&self, secret: &OtpSecret) -> Result<TOTP, VerificationError> {
        let bytes = decode_secret(secret.as_ref())?;
        // Unchecked: legacy 80 bit secrets are still in use
        Ok(TOTP::new_unchecked(
            self.algorithm,
            self.digits,
            0,
            self.step,
            bytes,
            None,
            String::new(),
        ))
    }
}

impl OtpVerifier for TotpRsVerifier {
    #[tracing::instrument(name = "TotpRsVerifier::verify", skip_all, fields(window = request.window))]
    fn verify(&self, request: &VerificationRequest) -> Result<ReplayKey, VerificationError> {
        let totp = self.totp(&request.secret)?;
        let code = request.code.as_ref().expose_secret();
        let current = unix_seconds(request.timestamp) / self.step;
        let window = u64::from(request.window);

        let mut replayed = false;
        for counter in current.saturating_sub(window)..=current.saturating_add(window) {
            if !totp.check(code, counter * self.step) {
                continue;
            }
            let key = ReplayKey::new(counter);
            if request.forbidden_key.is_some_and(|forbidden| key <= forbidden) {
                replayed = true;
                continue;
            }
            return Ok(key);
        }

        if replayed {
            Err(VerificationError::ReplayForbidden)
        } else {
            Err(VerificationError::CodeMismatch)
        }
    }
}

fn decode_secret(secret: &secrecy::Secret<String>) -> Result<Vec<u8>, VerificationError> {
    let normalised: String = secret
        .expose_secret()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    Secret::Encoded(normalised)
        .to_bytes()
        .map_err(|e| VerificationError::SecretInvalid(e.to_string()))
}

fn unix_seconds(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}
