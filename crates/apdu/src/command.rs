//! Command APDU structure and serialization.

use bytes::{BufMut, Bytes, BytesMut};

/// A command APDU in short form.
///
/// Holds the four header bytes, an optional data field and an optional
/// expected response length (`Le`). Instances are immutable values: build one
/// with [`Command::new`] and the `with_*` methods, then encode it with
/// [`Command::to_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Class byte (CLA)
    cla: u8,
    /// Instruction byte (INS)
    ins: u8,
    /// Parameter 1 (P1)
    p1: u8,
    /// Parameter 2 (P2)
    p2: u8,
    /// Optional command data field
    data: Option<Bytes>,
    /// Optional expected response length (Le)
    le: Option<u8>,
}

impl Command {
    /// Creates a new command with the given header bytes and no data field.
    #[must_use]
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self { cla, ins, p1, p2, data: None, le: None }
    }

    /// Returns a copy of this command with the given data field.
    ///
    /// Only short-form encoding is supported; a data field over 255 bytes
    /// cannot be represented in the one-byte Lc and is a caller bug.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when `data` exceeds 255 bytes.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        debug_assert!(
            data.len() <= usize::from(u8::MAX),
            "data field exceeds the short-form Lc limit"
        );
        self.data = Some(data);
        self
    }

    /// Returns a copy of this command with the given expected length byte.
    #[must_use]
    pub const fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Returns the class byte.
    #[must_use]
    pub const fn cla(&self) -> u8 {
        self.cla
    }

    /// Returns the instruction byte.
    #[must_use]
    pub const fn ins(&self) -> u8 {
        self.ins
    }

    /// Returns the first parameter byte.
    #[must_use]
    pub const fn p1(&self) -> u8 {
        self.p1
    }

    /// Returns the second parameter byte.
    #[must_use]
    pub const fn p2(&self) -> u8 {
        self.p2
    }

    /// Returns the command data field, if present.
    #[must_use]
    pub const fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Returns the expected response length, if set.
    #[must_use]
    pub const fn le(&self) -> Option<u8> {
        self.le
    }

    /// Serializes the command into wire format.
    ///
    /// Layout is `CLA INS P1 P2 [Lc DATA] [Le]`. Encoding the same command
    /// twice yields identical bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());

        buf.put_u8(self.cla);
        buf.put_u8(self.ins);
        buf.put_u8(self.p1);
        buf.put_u8(self.p2);

        if let Some(data) = &self.data {
            buf.put_u8(data.len() as u8);
            buf.put_slice(data);
        }

        if let Some(le) = self.le {
            buf.put_u8(le);
        }

        buf.freeze()
    }

    /// Returns the number of bytes [`Command::to_bytes`] will produce.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let mut len = 4;
        if let Some(data) = &self.data {
            len += 1 + data.len();
        }
        if self.le.is_some() {
            len += 1;
        }
        len
    }
}
