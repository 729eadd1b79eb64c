/// Key prefix under which root OTPs are stored in the secure store.
pub const OTP_KEY_PREFIX: &str = "otp_";

/// Minimum accepted access code length, in bytes.
pub const MIN_ACCESS_CODE_LEN: usize = 4;

/// Maximum accepted access code length, in bytes. Kept well below the
/// short-form APDU data limit so SET ACCESS CODE always frames cleanly.
pub const MAX_ACCESS_CODE_LEN: usize = 64;

pub mod cla {
    /// Proprietary class byte used by every activation applet command
    pub const PROPRIETARY: u8 = 0x80;
}

pub mod ins {
    /// ATTEST CARD KEY: sign a 32-byte digest with the card identity key
    pub const ATTEST_CARD_KEY: u8 = 0xB8;
    /// SET ACCESS CODE: configure the user-chosen access code
    pub const SET_ACCESS_CODE: u8 = 0xB2;
    /// CREATE WALLET: generate a wallet key pair on the given curve
    pub const CREATE_WALLET: u8 = 0xC4;
    /// GENERATE OTP: mint the provisioning secret for this activation
    pub const GENERATE_OTP: u8 = 0xD2;
    /// SIGN HASH: sign a 32-byte digest with a named wallet key
    pub const SIGN_HASH: u8 = 0xC0;
}

pub mod tags {
    /// Raw r || s signature (64 bytes)
    pub const SIGNATURE: u8 = 0x8A;
    /// Attestation salt (16 to 64 bytes)
    pub const SALT: u8 = 0x85;
    /// Wallet public key (uncompressed SEC1 point, 65 bytes)
    pub const WALLET_PUBLIC_KEY: u8 = 0x80;
    /// Root OTP provisioning secret (at least 16 bytes)
    pub const ROOT_OTP: u8 = 0x87;
    /// Elliptic curve identifier (1 byte)
    pub const CURVE_ID: u8 = 0x88;
}
