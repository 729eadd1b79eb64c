//! Response APDU parsing.

use bytes::Bytes;
use tracing::trace;

use crate::error::ApduError;
use crate::status::StatusWord;

/// A parsed response APDU.
///
/// Every response carries a trailing [`StatusWord`]; the payload before it
/// may be empty and is then represented as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response data field, if any bytes preceded the status word
    payload: Option<Bytes>,
    /// Trailing status word
    status: StatusWord,
}

impl Response {
    /// Creates a response from an already-split payload and status word.
    #[must_use]
    pub const fn new(payload: Option<Bytes>, status: StatusWord) -> Self {
        Self { payload, status }
    }

    /// Parses a raw response APDU, splitting the trailing two status bytes
    /// from the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApduError::Truncated`] when fewer than two bytes are given,
    /// since no status word can be recovered.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ApduError> {
        if raw.len() < 2 {
            return Err(ApduError::Truncated(raw.len()));
        }

        let (payload, trailer) = raw.split_at(raw.len() - 2);
        let status = StatusWord::new(trailer[0], trailer[1]);
        let payload = if payload.is_empty() {
            None
        } else {
            Some(Bytes::copy_from_slice(payload))
        };

        trace!(
            status = %status,
            payload = payload.as_deref().map(hex::encode).unwrap_or_default(),
            "parsed response APDU"
        );

        Ok(Self { payload, status })
    }

    /// Returns the response payload, if present.
    #[must_use]
    pub const fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Returns the trailing status word.
    #[must_use]
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Returns true when the status word is `90 00`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Consumes the response, returning its payload (possibly empty).
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_parse_status_only() {
        let resp = Response::from_bytes(&hex!("9000")).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.payload(), None);
    }

    #[test]
    fn test_parse_with_payload() {
        let resp = Response::from_bytes(&hex!("0102039000")).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.payload().map(|p| p.as_ref()), Some(hex!("010203").as_slice()));
        assert_eq!(resp.into_payload().as_ref(), hex!("010203"));
    }

    #[test]
    fn test_parse_error_status() {
        let resp = Response::from_bytes(&hex!("6985")).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.status(), StatusWord::new(0x69, 0x85));
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(Response::from_bytes(&[]), Err(ApduError::Truncated(0)));
        assert_eq!(Response::from_bytes(&[0x90]), Err(ApduError::Truncated(1)));
    }

    #[test]
    fn test_into_payload_empty() {
        let resp = Response::from_bytes(&hex!("6A88")).unwrap();
        assert!(resp.into_payload().is_empty());
    }
}
