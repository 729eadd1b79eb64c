//! Contactless transport session management.
//!
//! This crate owns everything between the APDU codec and the platform's NFC
//! facilities:
//!
//! - [`NfcReader`]: the session manager. It starts and stops scanning
//!   sessions, waits for a tag, sends command APDUs over the connected tag
//!   and recovers from transient radio faults by retrying and, when the
//!   retry budget runs out, by restarting discovery within the same session.
//! - [`TagDriver`] / [`TagChannel`]: the seam towards the platform. A driver
//!   performs tag discovery and hands out a channel per connected tag; the
//!   channel transceives raw APDU frames.
//! - Two watchdog timers bound every session: one for the session as a whole
//!   and one for the currently connected tag. Either elapsing invalidates
//!   the session.
//!
//! The reader is single-tracked on purpose: one session, one tag, one
//! command in flight. Exclusivity is enforced by `&mut self` receivers
//! rather than locks.

#![forbid(unsafe_code)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod reader;

pub use config::ReaderConfig;
pub use driver::{TagChannel, TagDriver};
pub use error::{NfcError, WatchdogKind};
pub use event::{EventSender, SessionEvent};
pub use reader::{NfcReader, SessionState};
