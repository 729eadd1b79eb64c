use derive_more::Display;
use sha2::{Digest, Sha256};

/// The opaque signable order payload fetched from the backend.
///
/// Arrives asynchronously and independently of card command progress.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{_0}")]
pub struct ActivationOrder(String);

impl ActivationOrder {
    /// Wraps the order string as delivered by the supplier.
    pub fn new(order: impl Into<String>) -> Self {
        Self(order.into())
    }

    /// The order as delivered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The deterministic signable form: SHA-256 over the UTF-8 bytes.
    ///
    /// Both the card signature and the wallet signature are produced over
    /// this same digest.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.0.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let order = ActivationOrder::new("order-123");
        assert_eq!(order.digest(), order.digest());
    }

    #[test]
    fn test_digest_known_vector() {
        // SHA-256 of the ASCII string "abc"
        let order = ActivationOrder::new("abc");
        assert_eq!(
            order.digest(),
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }
}
