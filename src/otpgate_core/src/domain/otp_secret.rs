use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OtpSecretError {
    #[error("Secret key cannot be empty")]
    Empty,
}

/// A principal's enrolled shared secret, base32 encoded.
///
/// An empty value is rejected at construction so that "has a secret" and
/// "2FA is activated" mean the same thing everywhere.
#[derive(Debug, Clone)]
pub struct OtpSecret(Secret<String>);

impl OtpSecret {
    /// Builds a secret from an optional stored column value, treating blank
    /// values as "not enrolled".
    pub fn from_optional(value: Option<String>) -> Option<Self> {
        value.and_then(|v| Self::try_from(Secret::new(v)).ok())
    }
}

impl TryFrom<Secret<String>> for OtpSecret {
    type Error = OtpSecretError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if value.expose_secret().trim().is_empty() {
            return Err(OtpSecretError::Empty);
        }
        Ok(Self(value))
    }
}

impl AsRef<Secret<String>> for OtpSecret {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
