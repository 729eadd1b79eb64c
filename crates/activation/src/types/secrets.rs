use std::fmt;

use zeroize::Zeroize;

/// The user-chosen access code, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct AccessCode(String);

impl AccessCode {
    /// Wraps a code. Length validation happens in the activation manager,
    /// before any session work.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as UTF-8 bytes, as the card receives it.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Byte length of the code.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty code.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCode(<redacted>)")
    }
}

/// The provisioning secret minted on-card, wiped from memory on drop.
///
/// Generated exactly once per activation attempt and carried through to the
/// terminal response; never regenerated mid-flow.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct RootOtp(Vec<u8>);

impl RootOtp {
    /// Wraps the secret bytes returned by the card.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns true when the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RootOtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RootOtp(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_do_not_leak_via_debug() {
        assert_eq!(format!("{:?}", AccessCode::new("1234")), "AccessCode(<redacted>)");
        assert_eq!(format!("{:?}", RootOtp::new(vec![0xAA; 32])), "RootOtp(<redacted>)");
    }

    #[test]
    fn test_access_code_bytes() {
        let code = AccessCode::new("1234");
        assert_eq!(code.as_bytes(), b"1234");
        assert_eq!(code.len(), 4);
        assert!(!code.is_empty());
    }
}
