use bytes::Bytes;
use cardtap_apdu::status::common;
use cardtap_apdu::{Command, Response};

use super::{find_primitive, parse_tlvs};
use crate::constants::{cla, ins, tags};

/// ATTEST CARD KEY command.
///
/// Asks the card to sign a 32-byte digest with its immutable identity key.
/// The response carries the signature together with a fresh salt that must
/// accompany it on redemption.
#[derive(Debug, Clone)]
pub struct AttestKeyCommand(Command);

impl AttestKeyCommand {
    /// Creates an ATTEST CARD KEY command over the given digest.
    #[must_use]
    pub fn with_digest(digest: &[u8; 32]) -> Self {
        Self(
            Command::new(cla::PROPRIETARY, ins::ATTEST_CARD_KEY, 0x00, 0x00)
                .with_data(Bytes::copy_from_slice(digest))
                .with_le(0x00),
        )
    }

    /// The wire command to transmit.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.0
    }

    /// Parses the card's reply into an [`Attestation`].
    ///
    /// # Errors
    ///
    /// Maps the known status words onto [`AttestKeyError`] variants and
    /// rejects structurally invalid payloads.
    pub fn parse_response(response: &Response) -> Result<Attestation, AttestKeyError> {
        match response.status() {
            common::SUCCESS => {
                let payload =
                    response.payload().ok_or(AttestKeyError::Malformed("no payload data"))?;
                let tlvs = parse_tlvs(payload);

                let signature = find_primitive(&tlvs, tags::SIGNATURE)
                    .ok_or(AttestKeyError::Malformed("signature TLV missing"))?;
                if signature.len() != 64 {
                    return Err(AttestKeyError::Malformed("signature is not 64 bytes"));
                }

                let salt = find_primitive(&tlvs, tags::SALT)
                    .ok_or(AttestKeyError::Malformed("salt TLV missing"))?;
                if salt.is_empty() {
                    return Err(AttestKeyError::Malformed("salt is empty"));
                }

                Ok(Attestation { signature: signature.into(), salt: salt.into() })
            }
            common::CONDITIONS_NOT_SATISFIED => Err(AttestKeyError::ConditionsNotSatisfied),
            common::AUTH_METHOD_BLOCKED => Err(AttestKeyError::KeyBlocked),
            other => Err(AttestKeyError::Unknown { sw1: other.sw1, sw2: other.sw2 }),
        }
    }
}

/// Successful ATTEST CARD KEY reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    /// Raw `r || s` signature over the digest
    pub signature: Bytes,
    /// Card-chosen salt bound to this attestation
    pub salt: Bytes,
}

/// Errors for the ATTEST CARD KEY command.
#[derive(Debug, thiserror::Error)]
pub enum AttestKeyError {
    /// Conditions not satisfied
    #[error("Conditions not satisfied: attestation requires a verified access code")]
    ConditionsNotSatisfied,

    /// Identity key usage is blocked
    #[error("Authentication method blocked: identity key is locked")]
    KeyBlocked,

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
    use hex_literal::hex;

    use super::*;
    use crate::commands::test_support::tlv;

    #[test]
    fn test_command_encoding() {
        let digest = [0xAB; 32];
        let cmd = AttestKeyCommand::with_digest(&digest);

        let bytes = cmd.command().to_bytes();
        assert_eq!(&bytes[..4], hex!("80B80000"));
        assert_eq!(bytes[4], 32);
        assert_eq!(&bytes[5..37], digest);
        assert_eq!(bytes[37], 0x00);
    }

    #[test]
    fn test_parse_success() {
        let mut payload = tlv(0x8A, &[0x11; 64]);
        payload.extend(tlv(0x85, &[0x22; 16]));
        let response = Response::new(Some(payload.into()), StatusWord::new(0x90, 0x00));

        let attestation = AttestKeyCommand::parse_response(&response).unwrap();
        assert_eq!(attestation.signature.as_ref(), [0x11; 64]);
        assert_eq!(attestation.salt.as_ref(), [0x22; 16]);
    }

    #[test]
    fn test_parse_rejects_missing_salt() {
        let payload = tlv(0x8A, &[0x11; 64]);
        let response = Response::new(Some(payload.into()), StatusWord::new(0x90, 0x00));

        assert!(matches!(
            AttestKeyCommand::parse_response(&response),
            Err(AttestKeyError::Malformed("salt TLV missing"))
        ));
    }

    #[test]
    fn test_parse_rejects_short_signature() {
        let mut payload = tlv(0x8A, &[0x11; 63]);
        payload.extend(tlv(0x85, &[0x22; 16]));
        let response = Response::new(Some(payload.into()), StatusWord::new(0x90, 0x00));

        assert!(matches!(
            AttestKeyCommand::parse_response(&response),
            Err(AttestKeyError::Malformed("signature is not 64 bytes"))
        ));
    }

    #[test]
    fn test_parse_status_words() {
        let denied = Response::new(None, StatusWord::new(0x69, 0x85));
        assert!(matches!(
            AttestKeyCommand::parse_response(&denied),
            Err(AttestKeyError::ConditionsNotSatisfied)
        ));

        let blocked = Response::new(None, StatusWord::new(0x69, 0x83));
        assert!(matches!(
            AttestKeyCommand::parse_response(&blocked),
            Err(AttestKeyError::KeyBlocked)
        ));

        let odd = Response::new(None, StatusWord::new(0x6F, 0x42));
        assert!(matches!(
            AttestKeyCommand::parse_response(&odd),
            Err(AttestKeyError::Unknown { sw1: 0x6F, sw2: 0x42 })
        ));
    }
}
