use bytes::{BufMut, Bytes, BytesMut};
use cardtap_apdu::status::common;
use cardtap_apdu::{Command, Response};
use iso7816_tlv::ber::{Tag, Tlv, Value};

use super::{find_primitive, parse_tlvs};
use crate::constants::{cla, ins, tags};
use crate::types::Wallet;

/// SIGN HASH command.
///
/// Signs a 32-byte digest with the named wallet key. The wallet is selected
/// by its public key, appended to the digest as a TLV.
#[derive(Debug, Clone)]
pub struct SignHashCommand(Command);

impl SignHashCommand {
    /// Creates a SIGN HASH command signing `digest` with `wallet`.
    ///
    /// # Errors
    ///
    /// Fails if the wallet selector TLV cannot be built.
    pub fn with_wallet_and_digest(
        wallet: &Wallet,
        digest: &[u8; 32],
    ) -> Result<Self, crate::Error> {
        let selector = Tlv::new(
            Tag::try_from(tags::WALLET_PUBLIC_KEY)?,
            Value::Primitive(wallet.public_key.to_vec()),
        )?
        .to_vec();

        let mut buf = BytesMut::with_capacity(digest.len() + selector.len());
        buf.put_slice(digest);
        buf.put_slice(&selector);

        Ok(Self(
            Command::new(cla::PROPRIETARY, ins::SIGN_HASH, 0x00, 0x00)
                .with_data(buf.freeze())
                .with_le(0x00),
        ))
    }

    /// The wire command to transmit.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.0
    }

    /// Parses the card's reply into the raw `r || s` signature.
    ///
    /// # Errors
    ///
    /// Maps the known status words onto [`SignHashError`] variants and
    /// rejects structurally invalid payloads.
    pub fn parse_response(response: &Response) -> Result<Bytes, SignHashError> {
        match response.status() {
            common::SUCCESS => {
                let payload =
                    response.payload().ok_or(SignHashError::Malformed("no payload data"))?;
                let tlvs = parse_tlvs(payload);

                let signature = find_primitive(&tlvs, tags::SIGNATURE)
                    .ok_or(SignHashError::Malformed("signature TLV missing"))?;
                if signature.len() != 64 {
                    return Err(SignHashError::Malformed("signature is not 64 bytes"));
                }

                Ok(signature.into())
            }
            common::CONDITIONS_NOT_SATISFIED => Err(SignHashError::ConditionsNotSatisfied),
            common::REFERENCED_DATA_NOT_FOUND => Err(SignHashError::WalletNotFound),
            common::WRONG_DATA => Err(SignHashError::WrongData),
            other => Err(SignHashError::Unknown { sw1: other.sw1, sw2: other.sw2 }),
        }
    }
}

/// Errors for the SIGN HASH command.
#[derive(Debug, thiserror::Error)]
pub enum SignHashError {
    /// Conditions not satisfied
    #[error("Conditions not satisfied: signing requires a verified access code")]
    ConditionsNotSatisfied,

    /// Referenced data not found
    #[error("Referenced data not found: no wallet with the given public key")]
    WalletNotFound,

    /// The card rejected the digest
    #[error("Wrong data: digest must be exactly 32 bytes")]
    WrongData,

    /// Payload did not have the expected structure
    #[error("Malformed response: {0}")]
    Malformed(&'static str),

    /// Any other status word
    #[error("Unknown status word: {sw1:02X}{sw2:02X}")]
    Unknown {
        /// First status byte
        sw1: u8,
        /// Second status byte
        sw2: u8,
    },
}

#[cfg(test)]
mod tests {
    use cardtap_apdu::StatusWord;

    use super::*;
    use crate::commands::test_support::tlv;
    use crate::types::EllipticCurve;

    fn wallet() -> Wallet {
        let mut point = vec![0x04];
        point.extend_from_slice(&[0x5A; 64]);
        Wallet { public_key: point.into(), curve: EllipticCurve::Secp256k1 }
    }

    #[test]
    fn test_command_encoding() {
        let digest = [0xCD; 32];
        let cmd = SignHashCommand::with_wallet_and_digest(&wallet(), &digest).unwrap();

        let bytes = cmd.command().to_bytes();
        assert_eq!(&bytes[..4], [0x80, 0xC0, 0x00, 0x00]);
        // Lc covers the digest plus the 67-byte selector TLV.
        assert_eq!(bytes[4], 32 + 67);
        assert_eq!(&bytes[5..37], digest);
        assert_eq!(&bytes[37..39], [0x80, 0x41]);
        assert_eq!(&bytes[39..104], wallet().public_key.as_ref());
        assert_eq!(bytes[104], 0x00);
    }

    #[test]
    fn test_parse_success() {
        let payload = tlv(0x8A, &[0x99; 64]);
        let response = Response::new(Some(payload.into()), StatusWord::new(0x90, 0x00));

        let signature = SignHashCommand::parse_response(&response).unwrap();
        assert_eq!(signature.as_ref(), [0x99; 64]);
    }

    #[test]
    fn test_parse_wallet_not_found() {
        let response = Response::new(None, StatusWord::new(0x6A, 0x88));
        assert!(matches!(
            SignHashCommand::parse_response(&response),
            Err(SignHashError::WalletNotFound)
        ));
    }

    #[test]
    fn test_parse_rejects_missing_signature() {
        let payload = tlv(0x85, &[0x22; 16]);
        let response = Response::new(Some(payload.into()), StatusWord::new(0x90, 0x00));

        assert!(matches!(
            SignHashCommand::parse_response(&response),
            Err(SignHashError::Malformed("signature TLV missing"))
        ));
    }
}
