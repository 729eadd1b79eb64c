//! Errors produced while framing APDUs.

/// Error type for APDU encoding and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApduError {
    /// The raw response was too short to contain a status word.
    #[error("response truncated: got {0} byte(s), need at least 2")]
    Truncated(usize),
}
