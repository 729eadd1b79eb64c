//! ISO 7816-4 APDU framing for contactless smart cards.
//!
//! This crate provides the wire-level building blocks shared by the higher
//! transport and activation layers:
//!
//! - [`Command`]: a command APDU (`CLA INS P1 P2 [Lc DATA] [Le]`) with
//!   builder-style constructors and deterministic encoding
//! - [`Response`]: a response APDU split into an optional payload and a
//!   trailing [`StatusWord`]
//! - [`StatusWord`]: the `SW1 SW2` status pair with predicates for the
//!   status families this stack cares about
//!
//! Framing is pure: encoding a [`Command`] and decoding a [`Response`] never
//! touch a transport. Everything transport-related lives one layer up.

#![forbid(unsafe_code)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod command;
pub mod error;
pub mod response;
pub mod status;

pub use command::Command;
pub use error::ApduError;
pub use response::Response;
pub use status::StatusWord;
