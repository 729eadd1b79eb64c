//! Status word (SW1-SW2) handling for response APDUs.

use std::fmt;

/// The two trailing status bytes of a response APDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

impl StatusWord {
    /// Creates a new status word from the two status bytes.
    #[must_use]
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Returns true for the normal completion status `90 00`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.sw1 == 0x90 && self.sw2 == 0x00
    }

    /// Returns true for the `63 CX` family, where the low nibble counts the
    /// remaining verification attempts.
    #[must_use]
    pub const fn is_attempt_counter(&self) -> bool {
        self.sw1 == 0x63 && (self.sw2 & 0xF0) == 0xC0
    }

    /// For a `63 CX` status, returns the number of attempts left.
    #[must_use]
    pub const fn remaining_attempts(&self) -> Option<u8> {
        if self.is_attempt_counter() {
            Some(self.sw2 & 0x0F)
        } else {
            None
        }
    }

    /// Returns the status word as a single big-endian `u16`.
    #[must_use]
    pub const fn to_u16(&self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }

    /// Creates a status word from a single big-endian `u16`.
    #[must_use]
    pub const fn from_u16(raw: u16) -> Self {
        Self { sw1: (raw >> 8) as u8, sw2: (raw & 0xFF) as u8 }
    }

    /// Returns a human-readable description of well-known status words.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => "Success",
            (0x67, 0x00) => "Wrong length",
            (0x69, 0x82) => "Security status not satisfied",
            (0x69, 0x83) => "Authentication method blocked",
            (0x69, 0x85) => "Conditions of use not satisfied",
            (0x6A, 0x80) => "Incorrect command data",
            (0x6A, 0x88) => "Referenced data not found",
            (0x6D, 0x00) => "Instruction not supported",
            (0x6E, 0x00) => "Class not supported",
            (0x63, _) if self.sw2 & 0xF0 == 0xC0 => "Verification failed, attempts remaining",
            _ => "Unknown status word",
        }
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}", self.sw1, self.sw2)
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from((sw1, sw2): (u8, u8)) -> Self {
        Self::new(sw1, sw2)
    }
}

impl From<StatusWord> for u16 {
    fn from(sw: StatusWord) -> Self {
        sw.to_u16()
    }
}

/// Well-known status words used across this stack.
pub mod common {
    use super::StatusWord;

    /// Normal completion (`90 00`)
    pub const SUCCESS: StatusWord = StatusWord::new(0x90, 0x00);
    /// Wrong length (`67 00`)
    pub const WRONG_LENGTH: StatusWord = StatusWord::new(0x67, 0x00);
    /// Security status not satisfied (`69 82`)
    pub const SECURITY_STATUS_NOT_SATISFIED: StatusWord = StatusWord::new(0x69, 0x82);
    /// Authentication method blocked (`69 83`)
    pub const AUTH_METHOD_BLOCKED: StatusWord = StatusWord::new(0x69, 0x83);
    /// Conditions of use not satisfied (`69 85`)
    pub const CONDITIONS_NOT_SATISFIED: StatusWord = StatusWord::new(0x69, 0x85);
    /// Incorrect command data (`6A 80`)
    pub const WRONG_DATA: StatusWord = StatusWord::new(0x6A, 0x80);
    /// Referenced data not found (`6A 88`)
    pub const REFERENCED_DATA_NOT_FOUND: StatusWord = StatusWord::new(0x6A, 0x88);
    /// Instruction not supported (`6D 00`)
    pub const INS_NOT_SUPPORTED: StatusWord = StatusWord::new(0x6D, 0x00);
    /// Class not supported (`6E 00`)
    pub const CLA_NOT_SUPPORTED: StatusWord = StatusWord::new(0x6E, 0x00);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_detection() {
        assert!(StatusWord::new(0x90, 0x00).is_success());
        assert!(!StatusWord::new(0x69, 0x85).is_success());
        assert!(!StatusWord::new(0x90, 0x01).is_success());
    }

    #[test]
    fn test_attempt_counter_family() {
        let sw = StatusWord::new(0x63, 0xC2);
        assert!(sw.is_attempt_counter());
        assert_eq!(sw.remaining_attempts(), Some(2));

        assert_eq!(StatusWord::new(0x63, 0xC0).remaining_attempts(), Some(0));
        assert_eq!(StatusWord::new(0x63, 0x00).remaining_attempts(), None);
        assert_eq!(StatusWord::new(0x90, 0x00).remaining_attempts(), None);
    }

    #[test]
    fn test_u16_round_trip() {
        let sw = StatusWord::new(0x6A, 0x88);
        assert_eq!(sw.to_u16(), 0x6A88);
        assert_eq!(StatusWord::from_u16(0x6A88), sw);
        assert_eq!(u16::from(sw), 0x6A88);
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusWord::new(0x90, 0x00).to_string(), "9000");
        assert_eq!(StatusWord::new(0x63, 0xC1).to_string(), "63C1");
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(common::SUCCESS.description(), "Success");
        assert_eq!(common::CONDITIONS_NOT_SATISFIED.description(), "Conditions of use not satisfied");
        assert_eq!(StatusWord::new(0x63, 0xC5).description(), "Verification failed, attempts remaining");
        assert_eq!(StatusWord::new(0x12, 0x34).description(), "Unknown status word");
    }
}
