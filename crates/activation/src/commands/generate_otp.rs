use cardtap_apdu::status::common;
use cardtap_apdu::{Command, Response};

use super::{find_primitive, parse_tlvs};
use crate::constants::{cla, ins, tags};
use crate::types::RootOtp;

/// GENERATE OTP command.
///
/// Mints the root provisioning secret for this activation. The applet
/// derives a new value on every call, so the engine must issue it exactly
/// once per activation attempt.
#[derive(Debug, Clone)]
pub struct GenerateOtpCommand(Command);

impl GenerateOtpCommand {
    /// Creates a GENERATE OTP command.
    #[must_use]
    pub const fn request() -> Self {
        Self(Command::new(cla::PROPRIETARY, ins::GENERATE_OTP, 0x00, 0x00).with_le(0x00))
    }

    /// The wire command to transmit.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.0
    }

    /// Parses the card's reply into the minted [`RootOtp`].
    ///
    /// # Errors
    ///
    /// Maps the known status words onto [`GenerateOtpError`] variants and
    /// rejects structurally invalid payloads.
    pub fn parse_response(response: &Response) -> Result<RootOtp, GenerateOtpError> {
        match response.status() {
            common::SUCCESS => {
                let payload =
                    response.payload().ok_or(GenerateOtpError::Malformed("no payload data"))?;
                let tlvs = parse_tlvs(payload);

                let otp = find_primitive(&tlvs, tags::ROOT_OTP)
                    .ok_or(GenerateOtpError::Malformed("root OTP TLV missing"))?;
                if otp.len() < 16 {
                    return Err(GenerateOtpError::Malformed("root OTP shorter than 16 bytes"));
                }

                Ok(RootOtp::new(otp))
            }
            common::CONDITIONS_NOT_SATISFIED => Err(GenerateOtpError::ConditionsNotSatisfied),
            common::SECURITY_STATUS_NOT_SATISFIED => Err(GenerateOtpError::SecurityStatus),
            other => Err(GenerateOtpError::Unknown { sw1: other.sw1, sw2: other.sw2 }),
        }
    }
}

/// Errors for the GENERATE OTP command.
#[derive(Debug, thiserror::Error)]
pub enum GenerateOtpError {
    /// Conditions not satisfied
    #[error("Conditions not satisfied: OTP generation requires completed card setup")]
    ConditionsNotSatisfied,

    /// Security status not satisfied
    #[error("Security status not satisfied: access code not verified")]
    SecurityStatus,

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
        assert_eq!(GenerateOtpCommand::request().command().to_bytes().as_ref(), hex!("80D2000000"));
    }

    #[test]
    fn test_parse_success() {
        let payload = tlv(0x87, &[0x77; 32]);
        let response = Response::new(Some(payload.into()), StatusWord::new(0x90, 0x00));

        let otp = GenerateOtpCommand::parse_response(&response).unwrap();
        assert_eq!(otp.as_bytes(), [0x77; 32]);
    }

    #[test]
    fn test_parse_rejects_short_otp() {
        let payload = tlv(0x87, &[0x77; 15]);
        let response = Response::new(Some(payload.into()), StatusWord::new(0x90, 0x00));

        assert!(matches!(
            GenerateOtpCommand::parse_response(&response),
            Err(GenerateOtpError::Malformed("root OTP shorter than 16 bytes"))
        ));
    }

    #[test]
    fn test_parse_security_status() {
        let response = Response::new(None, StatusWord::new(0x69, 0x82));
        assert!(matches!(
            GenerateOtpCommand::parse_response(&response),
            Err(GenerateOtpError::SecurityStatus)
        ));
    }
}
