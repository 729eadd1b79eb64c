pub mod attest_key;
pub use attest_key::*;
pub mod create_wallet;
pub use create_wallet::*;
pub mod generate_otp;
pub use generate_otp::*;
pub mod set_access_code;
pub use set_access_code::*;
pub mod sign_hash;
pub use sign_hash::*;

use iso7816_tlv::ber::{Tag, Tlv, Value};

/// Parses every BER-TLV object in a response payload.
///
/// The activation applet returns flat sequences of primitive TLVs, so no
/// recursion into constructed values is needed.
pub(crate) fn parse_tlvs(payload: &[u8]) -> Vec<Tlv> {
    Tlv::parse_all(payload)
}

/// Returns the primitive value carried under `tag`, if any TLV in `tlvs`
/// has it.
pub(crate) fn find_primitive(tlvs: &[Tlv], tag: u8) -> Option<Vec<u8>> {
    let tag = Tag::try_from(tag).ok()?;
    tlvs.iter().find(|tlv| *tlv.tag() == tag).and_then(|tlv| match tlv.value() {
        Value::Primitive(bytes) => Some(bytes.clone()),
        Value::Constructed(_) => None,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use bytes::{BufMut, BytesMut};

    /// Encodes a single-byte-tag primitive TLV for response fixtures.
    pub(crate) fn tlv(tag: u8, value: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(2 + value.len());
        buf.put_u8(tag);
        buf.put_u8(value.len() as u8);
        buf.put_slice(value);
        buf.to_vec()
    }
}
