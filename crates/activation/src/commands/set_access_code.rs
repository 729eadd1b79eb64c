use bytes::Bytes;
use cardtap_apdu::status::common;
use cardtap_apdu::{Command, Response};

use crate::constants::{cla, ins};
use crate::types::AccessCode;

/// SET ACCESS CODE command.
///
/// Installs the user-chosen access code on the card. Replaying it with the
/// same code is accepted by the applet, so the setup flow can safely run
/// again after an interrupted attempt.
#[derive(Debug, Clone)]
pub struct SetAccessCodeCommand(Command);

impl SetAccessCodeCommand {
    /// Creates a SET ACCESS CODE command carrying `code`.
    #[must_use]
    pub fn with_code(code: &AccessCode) -> Self {
        Self(
            Command::new(cla::PROPRIETARY, ins::SET_ACCESS_CODE, 0x00, 0x00)
                .with_data(Bytes::copy_from_slice(code.as_bytes())),
        )
    }

    /// The wire command to transmit.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.0
    }

    /// Checks the card's reply.
    ///
    /// # Errors
    ///
    /// Maps the known status words onto [`SetAccessCodeError`] variants.
    pub fn parse_response(response: &Response) -> Result<(), SetAccessCodeError> {
        match response.status() {
            common::SUCCESS => Ok(()),
            common::WRONG_DATA => Err(SetAccessCodeError::WrongData),
            common::CONDITIONS_NOT_SATISFIED => Err(SetAccessCodeError::ConditionsNotSatisfied),
            sw if sw.is_attempt_counter() => {
                // remaining_attempts is Some for every 63 CX word.
                let remaining = sw.remaining_attempts().unwrap_or(0);
                Err(SetAccessCodeError::VerificationFailed { remaining })
            }
            other => Err(SetAccessCodeError::Unknown { sw1: other.sw1, sw2: other.sw2 }),
        }
    }
}

/// Errors for the SET ACCESS CODE command.
#[derive(Debug, thiserror::Error)]
pub enum SetAccessCodeError {
    /// The card rejected the code format
    #[error("Wrong data: access code format rejected by the card")]
    WrongData,

    /// Conditions not satisfied
    #[error("Conditions not satisfied: card does not accept a new access code now")]
    ConditionsNotSatisfied,

    /// The previous code must be verified first and verification failed
    #[error("Verification failed: {remaining} attempt(s) remaining")]
    VerificationFailed {
        /// Attempts left before the card locks
        remaining: u8,
    },

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

    #[test]
    fn test_command_encoding() {
        let code = AccessCode::new("123456");
        let cmd = SetAccessCodeCommand::with_code(&code);
        assert_eq!(cmd.command().to_bytes().as_ref(), hex!("80B2000006313233343536"));
    }

    #[test]
    fn test_parse_success() {
        let response = Response::new(None, StatusWord::new(0x90, 0x00));
        assert!(SetAccessCodeCommand::parse_response(&response).is_ok());
    }

    #[test]
    fn test_parse_attempt_counter() {
        let response = Response::new(None, StatusWord::new(0x63, 0xC2));
        assert!(matches!(
            SetAccessCodeCommand::parse_response(&response),
            Err(SetAccessCodeError::VerificationFailed { remaining: 2 })
        ));
    }

    #[test]
    fn test_parse_wrong_data() {
        let response = Response::new(None, StatusWord::new(0x6A, 0x80));
        assert!(matches!(
            SetAccessCodeCommand::parse_response(&response),
            Err(SetAccessCodeError::WrongData)
        ));
    }
}
