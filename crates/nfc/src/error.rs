//! Error types for the contactless transport.

use cardtap_apdu::ApduError;

/// Which watchdog timer elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum WatchdogKind {
    /// The bound on the whole scanning session
    #[display("session")]
    Session,
    /// The bound on a single tag connection
    #[display("tag")]
    Tag,
}

/// Transport-layer errors.
///
/// Protocol-level outcomes (non-success status words) are not errors at this
/// layer; they travel inside [`Response`](cardtap_apdu::Response) and are
/// interpreted by the protocol layer above.
#[derive(Debug, thiserror::Error)]
pub enum NfcError {
    /// No scanning session has been started.
    #[error("no active session")]
    NoSession,

    /// A command was issued while no tag was connected.
    #[error("no tag connected")]
    NotConnected,

    /// The tag left the field during an exchange.
    #[error("tag lost")]
    TagLost,

    /// The exchange failed below the APDU layer.
    #[error("transmission failed: {0}")]
    Transmission(String),

    /// A watchdog timer elapsed before the guarded step finished.
    #[error("{0} watchdog elapsed")]
    Timeout(WatchdogKind),

    /// The platform invalidated the session.
    #[error("session invalidated: {0}")]
    SessionInvalidated(String),

    /// The user dismissed the platform scanning UI.
    #[error("cancelled by user")]
    UserCancelled,

    /// The response frame could not be parsed.
    #[error(transparent)]
    Apdu(#[from] ApduError),
}

impl NfcError {
    /// Returns true for faults worth retrying against the same tag.
    ///
    /// Radio glitches and garbled frames are transient; timeouts,
    /// invalidation and cancellation end the session.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TagLost | Self::Transmission(_) | Self::Apdu(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(NfcError::TagLost.is_transient());
        assert!(NfcError::Transmission("crc".into()).is_transient());
        assert!(NfcError::Apdu(ApduError::Truncated(1)).is_transient());

        assert!(!NfcError::NoSession.is_transient());
        assert!(!NfcError::NotConnected.is_transient());
        assert!(!NfcError::Timeout(WatchdogKind::Session).is_transient());
        assert!(!NfcError::SessionInvalidated("busy".into()).is_transient());
        assert!(!NfcError::UserCancelled.is_transient());
    }

    #[test]
    fn test_watchdog_display() {
        assert_eq!(
            NfcError::Timeout(WatchdogKind::Session).to_string(),
            "session watchdog elapsed"
        );
        assert_eq!(NfcError::Timeout(WatchdogKind::Tag).to_string(), "tag watchdog elapsed");
    }
}
