use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cardtap_nfc::{NfcReader, TagDriver};
use tracing::debug;

use crate::commands::{CreateWalletCommand, SetAccessCodeCommand};
use crate::error::Result;
use crate::types::{AccessCode, Card, EllipticCurve};

/// Result of one card setup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Access code and mandatory wallet are in place.
    Completed,
    /// The cancellation flag was raised; setup stopped between steps.
    Cancelled,
}

/// Prepares a card for activation: installs the access code and makes sure
/// the mandatory-curve wallet exists.
///
/// Both steps are idempotent on the card side, so an interrupted run can be
/// repeated from the start. A shared cancellation flag is checked before
/// every step; cancellation stops the run without treating it as a failure.
#[derive(Debug, Clone, Default)]
pub struct CardSetupHandler {
    cancelled: Arc<AtomicBool>,
}

impl CardSetupHandler {
    /// Creates a handler with the cancellation flag cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the cancellation flag. The current run stops before its next
    /// step; no card state is rolled back.
    pub fn cancel_card_setup(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the cancellation flag is raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clears the cancellation flag so the handler can serve a new attempt.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Runs card setup over an established tag connection.
    ///
    /// Appends any wallet it creates to `card`, keeping the caller's view of
    /// the card current for the rest of the activation flow.
    ///
    /// # Errors
    ///
    /// Propagates transport and command failures. Cancellation is reported
    /// through [`SetupOutcome::Cancelled`], not as an error.
    pub async fn setup_card<D: TagDriver>(
        &self,
        reader: &mut NfcReader<D>,
        card: &mut Card,
        access_code: &AccessCode,
    ) -> Result<SetupOutcome> {
        if self.is_cancelled() {
            debug!("Card setup cancelled before installing the access code");
            return Ok(SetupOutcome::Cancelled);
        }

        let set_code = SetAccessCodeCommand::with_code(access_code);
        let response = reader.send(set_code.command()).await?;
        SetAccessCodeCommand::parse_response(&response)?;
        debug!("Access code installed on card {}", card.card_id);

        if self.is_cancelled() {
            debug!("Card setup cancelled before wallet creation");
            return Ok(SetupOutcome::Cancelled);
        }

        if card.wallet_for(EllipticCurve::MANDATORY).is_none() {
            let create = CreateWalletCommand::with_curve(EllipticCurve::MANDATORY)?;
            let response = reader.send(create.command()).await?;
            let wallet = CreateWalletCommand::parse_response(&response, EllipticCurve::MANDATORY)?;
            debug!("Created {} wallet on card {}", wallet.curve, card.card_id);
            card.wallets.push(wallet);
        } else {
            debug!("Card {} already has a {} wallet", card.card_id, EllipticCurve::MANDATORY);
        }

        Ok(SetupOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_round_trip() {
        let handler = CardSetupHandler::new();
        assert!(!handler.is_cancelled());

        handler.cancel_card_setup();
        assert!(handler.is_cancelled());

        // Clones share the flag.
        let clone = handler.clone();
        assert!(clone.is_cancelled());

        handler.reset();
        assert!(!clone.is_cancelled());
    }
}
