//! The seam between the reader and the platform's NFC facilities.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::NfcError;
use crate::event::EventSender;

/// One connected tag's half-duplex APDU channel.
#[async_trait]
pub trait TagChannel: Send + fmt::Debug {
    /// Transmits one raw command APDU frame and awaits the raw response,
    /// payload and status trailer included.
    async fn transceive(&mut self, payload: &[u8]) -> Result<Bytes, NfcError>;
}

/// Platform tag discovery and session control.
///
/// Implementations wrap whatever the platform offers, from an embedded
/// reader chip to a phone's tag-reader session. The reader owns its driver
/// exclusively, so every method takes `&mut self`.
#[async_trait]
pub trait TagDriver: Send + Sync + fmt::Debug {
    /// Channel type produced for each connected tag.
    type Channel: TagChannel;

    /// Starts platform-level polling for tags.
    ///
    /// The driver keeps `events` for the lifetime of the session and uses
    /// it to report asynchronous invalidation.
    async fn begin_polling(&mut self, events: EventSender) -> Result<(), NfcError>;

    /// Waits until a tag enters the field and is connected.
    async fn await_tag(&mut self) -> Result<Self::Channel, NfcError>;

    /// Drops the current tag and resumes discovery within the same session.
    async fn restart_polling(&mut self) -> Result<(), NfcError>;

    /// Ends the platform session.
    ///
    /// `halt_message` is shown by drivers that surface a scanning UI.
    async fn end_session(&mut self, halt_message: Option<&str>) -> Result<(), NfcError>;
}
