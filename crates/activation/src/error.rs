use iso7816_tlv::TlvError;

use cardtap_nfc::NfcError;

use crate::commands::{
    AttestKeyError, CreateWalletError, GenerateOtpError, SetAccessCodeError, SignHashError,
};

/// Result type for activation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by external collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for activation operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-related errors
    #[error(transparent)]
    Nfc(#[from] NfcError),

    /// Input validation failures, raised before any transport work
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another activation attempt is already running
    #[error("an activation attempt is already in progress")]
    ActivationInProgress,

    /// Internal logic violations. These indicate a bug in the engine, not
    /// a recoverable user condition.
    #[error("invariant violated: {0}")]
    Invariant(&'static str),

    /// The order supplier failed or went away
    #[error("order supplier failed")]
    OrderSupplier(#[source] BoxError),

    /// The token exchange rejected the signed challenge
    #[error("token exchange failed")]
    TokenExchange(#[source] BoxError),

    /// The secure store backing failed
    #[error("secure store failed")]
    SecureStore(#[source] BoxError),

    // Commands
    #[error(transparent)]
    AttestKey(#[from] AttestKeyError),

    #[error(transparent)]
    SetAccessCode(#[from] SetAccessCodeError),

    #[error(transparent)]
    CreateWallet(#[from] CreateWalletError),

    #[error(transparent)]
    GenerateOtp(#[from] GenerateOtpError),

    #[error(transparent)]
    SignHash(#[from] SignHashError),

    #[error("TlvError: {0}")]
    Tlv(TlvError),
}

impl From<TlvError> for Error {
    fn from(error: TlvError) -> Self {
        Self::Tlv(error)
    }
}

/// Validation failures for caller-supplied input
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The access code is shorter than the minimum
    #[error("access code must be at least {} bytes", crate::constants::MIN_ACCESS_CODE_LEN)]
    AccessCodeTooShort,

    /// The access code is longer than the maximum
    #[error("access code must be at most {} bytes", crate::constants::MAX_ACCESS_CODE_LEN)]
    AccessCodeTooLong,

    /// No access code was saved before starting activation
    #[error("no access code saved")]
    MissingAccessCode,
}
