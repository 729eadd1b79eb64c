use bytes::Bytes;
use derive_more::Display;

/// Elliptic curves the activation applet can host wallets on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EllipticCurve {
    /// secp256k1
    #[display("secp256k1")]
    Secp256k1,
}

impl EllipticCurve {
    /// The curve every card must carry a wallet for before activation.
    pub const MANDATORY: Self = Self::Secp256k1;

    /// Wire identifier used in the CURVE_ID TLV.
    pub const fn id(self) -> u8 {
        match self {
            Self::Secp256k1 => 0x01,
        }
    }
}

/// A wallet key pair living on the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    /// Uncompressed SEC1 public key point (65 bytes)
    pub public_key: Bytes,
    /// Curve the key pair lives on
    pub curve: EllipticCurve,
}

/// The card under activation, as known to the calling application.
///
/// Read-only input from the engine's perspective: the engine appends wallets
/// it creates to its own working copy but never persists changes outward.
#[derive(Debug, Clone)]
pub struct Card {
    /// Issuer-assigned card identifier
    pub card_id: String,
    /// The card's identity public key
    pub card_public_key: Bytes,
    /// Wallets known to exist on the card
    pub wallets: Vec<Wallet>,
}

impl Card {
    /// Returns the wallet for `curve`, if the card has one.
    #[must_use]
    pub fn wallet_for(&self, curve: EllipticCurve) -> Option<&Wallet> {
        self.wallets.iter().find(|wallet| wallet.curve == curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_wire_id() {
        assert_eq!(EllipticCurve::Secp256k1.id(), 0x01);
        assert_eq!(EllipticCurve::MANDATORY, EllipticCurve::Secp256k1);
    }

    #[test]
    fn test_wallet_lookup() {
        let wallet = Wallet {
            public_key: Bytes::from_static(&[0x04; 65]),
            curve: EllipticCurve::Secp256k1,
        };
        let card = Card {
            card_id: "card-1".into(),
            card_public_key: Bytes::from_static(&[0x02; 33]),
            wallets: vec![wallet.clone()],
        };

        assert_eq!(card.wallet_for(EllipticCurve::MANDATORY), Some(&wallet));

        let empty = Card { wallets: vec![], ..card };
        assert_eq!(empty.wallet_for(EllipticCurve::MANDATORY), None);
    }
}
