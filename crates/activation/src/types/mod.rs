mod card;
mod order;
mod response;
mod secrets;

pub use card::{Card, EllipticCurve, Wallet};
pub use order::ActivationOrder;
pub use response::{ActivationOutcome, ResponseBuilder, VisaCardActivationResponse};
pub use secrets::{AccessCode, RootOtp};
