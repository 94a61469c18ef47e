use secrecy::{ExposeSecret, Secret};

/// A code submitted by the user, normalised and guaranteed non-empty.
#[derive(Debug, Clone)]
pub struct OneTimePassword(Secret<String>);

impl OneTimePassword {
    /// Normalises user input: surrounding whitespace and inner spaces or
    /// dashes (as copied from authenticator apps) are dropped.
    ///
    /// Returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if cleaned.is_empty() {
            None
        } else {
            Some(Self(Secret::new(cleaned)))
        }
    }
}

impl AsRef<Secret<String>> for OneTimePassword {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for OneTimePassword {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

/// What the request carried in the OTP input field.
#[derive(Debug, Clone, PartialEq)]
pub enum OtpInput {
    /// Nothing was submitted; the client should be shown the challenge.
    Absent,
    /// A submission was made but the code was missing or blank.
    Empty,
    Provided(OneTimePassword),
}

impl OtpInput {
    /// Classifies a raw field value from a submitting request.
    ///
    /// A missing field on a submission counts as [`OtpInput::Empty`].
    pub fn from_submission(raw: Option<&str>) -> Self {
        match raw.and_then(OneTimePassword::parse) {
            Some(code) => OtpInput::Provided(code),
            None => OtpInput::Empty,
        }
    }

    /// Classifies a raw field value from a request that may simply be
    /// browsing (e.g. a GET): a missing field means [`OtpInput::Absent`].
    pub fn from_optional(raw: Option<&str>) -> Self {
        match raw {
            None => OtpInput::Absent,
            Some(value) => Self::from_submission(Some(value)),
        }
    }
}
