use bytes::Bytes;
use tracing::error;

use super::RootOtp;
use crate::error::Error;

/// Terminal result of one activation attempt.
#[derive(Debug)]
pub enum ActivationOutcome {
    /// Every step succeeded; the dually-signed order is ready.
    Completed(VisaCardActivationResponse),
    /// The user cancelled; nothing is reported to them.
    Cancelled,
}

/// The terminal success value: a dually-signed activation order plus the
/// provisioning secret.
///
/// Can only be produced through [`ResponseBuilder`], so a value with any
/// part missing is unrepresentable.
#[derive(Debug, Clone)]
pub struct VisaCardActivationResponse {
    signed_order_by_card: Bytes,
    signed_order_by_wallet: Bytes,
    root_otp: RootOtp,
}

impl VisaCardActivationResponse {
    /// Starts assembling a response.
    #[must_use]
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    /// The order signature produced with the card identity key.
    #[must_use]
    pub const fn signed_order_by_card(&self) -> &Bytes {
        &self.signed_order_by_card
    }

    /// The order signature produced with the mandatory-curve wallet key.
    #[must_use]
    pub const fn signed_order_by_wallet(&self) -> &Bytes {
        &self.signed_order_by_wallet
    }

    /// The root OTP minted during this attempt.
    #[must_use]
    pub const fn root_otp(&self) -> &RootOtp {
        &self.root_otp
    }
}

/// Assembles a [`VisaCardActivationResponse`]; refuses to build while any
/// part is missing.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    signed_order_by_card: Option<Bytes>,
    signed_order_by_wallet: Option<Bytes>,
    root_otp: Option<RootOtp>,
}

impl ResponseBuilder {
    /// Sets the card-key order signature.
    #[must_use]
    pub fn with_signed_order_by_card(mut self, signature: Bytes) -> Self {
        self.signed_order_by_card = Some(signature);
        self
    }

    /// Sets the wallet-key order signature.
    #[must_use]
    pub fn with_signed_order_by_wallet(mut self, signature: Bytes) -> Self {
        self.signed_order_by_wallet = Some(signature);
        self
    }

    /// Sets the root OTP.
    #[must_use]
    pub fn with_root_otp(mut self, otp: RootOtp) -> Self {
        self.root_otp = Some(otp);
        self
    }

    /// Builds the terminal response.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Invariant`] while any part is missing. Reaching
    /// that path means a step was skipped, which is a bug in the caller's
    /// sequencing, so it is logged loudly.
    pub fn build(self) -> Result<VisaCardActivationResponse, Error> {
        let missing = match (&self.signed_order_by_card, &self.signed_order_by_wallet, &self.root_otp)
        {
            (Some(_), Some(_), Some(_)) => None,
            (None, _, _) => Some("card order signature missing from terminal response"),
            (_, None, _) => Some("wallet order signature missing from terminal response"),
            (_, _, None) => Some("root OTP missing from terminal response"),
        };
        if let Some(what) = missing {
            error!("Refusing to build a partial activation response: {}", what);
            return Err(Error::Invariant(what));
        }

        // The match above proves all three are present.
        let (Some(signed_order_by_card), Some(signed_order_by_wallet), Some(root_otp)) =
            (self.signed_order_by_card, self.signed_order_by_wallet, self.root_otp)
        else {
            return Err(Error::Invariant("terminal response assembly"));
        };
        Ok(VisaCardActivationResponse { signed_order_by_card, signed_order_by_wallet, root_otp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_sig() -> Bytes {
        Bytes::from_static(&[0x11; 64])
    }

    fn wallet_sig() -> Bytes {
        Bytes::from_static(&[0x22; 64])
    }

    fn otp() -> RootOtp {
        RootOtp::new(vec![0x33; 32])
    }

    #[test]
    fn test_complete_build_succeeds() {
        let response = VisaCardActivationResponse::builder()
            .with_signed_order_by_card(card_sig())
            .with_signed_order_by_wallet(wallet_sig())
            .with_root_otp(otp())
            .build()
            .unwrap();

        assert_eq!(response.signed_order_by_card(), &card_sig());
        assert_eq!(response.signed_order_by_wallet(), &wallet_sig());
        assert_eq!(response.root_otp().as_bytes(), otp().as_bytes());
    }

    #[test]
    fn test_every_incomplete_combination_is_rejected() {
        // All subsets of parts except the full set.
        for mask in 0u8..7 {
            let mut builder = VisaCardActivationResponse::builder();
            if mask & 1 != 0 {
                builder = builder.with_signed_order_by_card(card_sig());
            }
            if mask & 2 != 0 {
                builder = builder.with_signed_order_by_wallet(wallet_sig());
            }
            if mask & 4 != 0 {
                builder = builder.with_root_otp(otp());
            }

            assert!(
                matches!(builder.build(), Err(Error::Invariant(_))),
                "partial response must not build (mask {mask:03b})"
            );
        }
    }
}
