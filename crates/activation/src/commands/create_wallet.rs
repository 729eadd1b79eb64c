use bytes::Bytes;
use cardtap_apdu::status::common;
use cardtap_apdu::{Command, Response};
use iso7816_tlv::ber::{Tag, Tlv, Value};

use super::{find_primitive, parse_tlvs};
use crate::constants::{cla, ins, tags};
use crate::types::{EllipticCurve, Wallet};

/// CREATE WALLET command.
///
/// Asks the card to generate a fresh key pair on the requested curve. The
/// reply carries the new wallet's public key; the private half never leaves
/// the card.
#[derive(Debug, Clone)]
pub struct CreateWalletCommand(Command);

impl CreateWalletCommand {
    /// Creates a CREATE WALLET command for `curve`.
    ///
    /// # Errors
    ///
    /// Fails if the curve identifier TLV cannot be built.
    pub fn with_curve(curve: EllipticCurve) -> Result<Self, crate::Error> {
        let buf = Bytes::from(
            Tlv::new(Tag::try_from(tags::CURVE_ID)?, Value::Primitive(vec![curve.id()]))?.to_vec(),
        );

        Ok(Self(
            Command::new(cla::PROPRIETARY, ins::CREATE_WALLET, 0x00, 0x00)
                .with_data(buf)
                .with_le(0x00),
        ))
    }

    /// The wire command to transmit.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.0
    }

    /// Parses the card's reply into the created [`Wallet`].
    ///
    /// # Errors
    ///
    /// Maps the known status words onto [`CreateWalletError`] variants and
    /// rejects structurally invalid payloads.
    pub fn parse_response(
        response: &Response,
        curve: EllipticCurve,
    ) -> Result<Wallet, CreateWalletError> {
        match response.status() {
            common::SUCCESS => {
                let payload =
                    response.payload().ok_or(CreateWalletError::Malformed("no payload data"))?;
                let tlvs = parse_tlvs(payload);

                let public_key = find_primitive(&tlvs, tags::WALLET_PUBLIC_KEY)
                    .ok_or(CreateWalletError::Malformed("public key TLV missing"))?;
                if public_key.len() != 65 || public_key[0] != 0x04 {
                    return Err(CreateWalletError::Malformed(
                        "public key is not an uncompressed SEC1 point",
                    ));
                }

                Ok(Wallet { public_key: public_key.into(), curve })
            }
            common::CONDITIONS_NOT_SATISFIED => Err(CreateWalletError::ConditionsNotSatisfied),
            common::WRONG_DATA => Err(CreateWalletError::UnsupportedCurve),
            other => Err(CreateWalletError::Unknown { sw1: other.sw1, sw2: other.sw2 }),
        }
    }
}

/// Errors for the CREATE WALLET command.
#[derive(Debug, thiserror::Error)]
pub enum CreateWalletError {
    /// Conditions not satisfied
    #[error("Conditions not satisfied: wallet creation requires a verified access code")]
    ConditionsNotSatisfied,

    /// The card does not implement the requested curve
    #[error("Wrong data: requested curve is not supported by the card")]
    UnsupportedCurve,

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
