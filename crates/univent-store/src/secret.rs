//! Redacting wrapper for credential values.

use std::fmt;

use zeroize::Zeroizing;

/// A credential value read from a [`crate::CredentialStore`].
///
/// `Debug` prints `Secret(<redacted>)` and the backing buffer is zeroed when
/// the value is dropped, so a token never lingers in freed memory or ends up
/// in a log line by accident. Use [`Secret::expose`] at the single point where
/// the raw value is needed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Wrap a raw value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Raw value.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_redacted() {
        let secret = Secret::new("t0ps3cret");
        assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
        assert_eq!(secret.expose(), "t0ps3cret");
    }
}
