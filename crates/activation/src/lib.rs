mod collaborators;
mod commands;
mod constants;
mod error;
mod manager;
mod otp_store;
mod setup;
mod task;
mod types;

pub use collaborators::{OrderSupplier, SecureStore, TokenExchange};
pub use commands::*;
pub use error::{BoxError, Error, Result, ValidationError};
pub use manager::{ActivationManager, CancelHandle};
pub use otp_store::RootOtpStore;
pub use setup::{CardSetupHandler, SetupOutcome};
pub use task::{ActivationServices, ActivationTask};
pub use types::{
    AccessCode, ActivationOrder, ActivationOutcome, Card, EllipticCurve, ResponseBuilder, RootOtp,
    VisaCardActivationResponse, Wallet,
};

pub use constants::*;
