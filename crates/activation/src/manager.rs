use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cardtap_nfc::{NfcReader, TagDriver};
use tracing::{debug, warn};

use crate::collaborators::OrderSupplier;
use crate::constants::{MAX_ACCESS_CODE_LEN, MIN_ACCESS_CODE_LEN};
use crate::error::{Error, Result, ValidationError};
use crate::setup::CardSetupHandler;
use crate::task::{ActivationServices, ActivationTask};
use crate::types::{AccessCode, ActivationOutcome, Card};

/// Owns the reader and the cross-attempt state: the saved access code and
/// the collaborator set.
///
/// The calling application validates and saves the access code first, then
/// runs attempts through [`start_activation`](Self::start_activation). Only
/// one attempt can run at a time.
#[derive(Debug)]
pub struct ActivationManager<D: TagDriver> {
    reader: NfcReader<D>,
    services: ActivationServices,
    access_code: Option<AccessCode>,
    running: Arc<AtomicBool>,
}

impl<D: TagDriver> ActivationManager<D> {
    /// Creates a manager over `reader` and the given collaborators.
    pub fn new(reader: NfcReader<D>, services: ActivationServices) -> Self {
        Self { reader, services, access_code: None, running: Arc::new(AtomicBool::new(false)) }
    }

    /// Validates and stores the user-chosen access code.
    ///
    /// Kept separate from [`start_activation`](Self::start_activation) so
    /// the caller can validate user input without opening a card session.
    ///
    /// # Errors
    ///
    /// [`ValidationError::AccessCodeTooShort`] or
    /// [`ValidationError::AccessCodeTooLong`] when `code` is outside the
    /// accepted length bounds.
    pub fn save_access_code(&mut self, code: &str) -> Result<()> {
        if code.len() < MIN_ACCESS_CODE_LEN {
            return Err(ValidationError::AccessCodeTooShort.into());
        }
        if code.len() > MAX_ACCESS_CODE_LEN {
            return Err(ValidationError::AccessCodeTooLong.into());
        }
        self.access_code = Some(AccessCode::new(code));
        Ok(())
    }

    /// Whether an access code has been saved.
    #[must_use]
    pub const fn has_access_code(&self) -> bool {
        self.access_code.is_some()
    }

    /// Returns a handle that cancels an in-flight attempt from another
    /// task.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            setup: self.services.setup.clone(),
            supplier: Arc::clone(&self.services.order_supplier),
        }
    }

    /// Runs one activation attempt for `card`.
    ///
    /// Supply `challenge` when the backend demands a fresh proof of card
    /// possession. The transport session is closed before this returns,
    /// whatever the outcome.
    ///
    /// # Errors
    ///
    /// [`Error::ActivationInProgress`] when another attempt is running,
    /// [`ValidationError::MissingAccessCode`] when no access code has been
    /// saved, and otherwise the terminal error of the attempt itself.
    pub async fn start_activation(
        &mut self,
        card: Card,
        challenge: Option<String>,
    ) -> Result<ActivationOutcome> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Rejecting start_activation: an attempt is already running");
            return Err(Error::ActivationInProgress);
        }
        let _running = RunningGuard(Arc::clone(&self.running));

        // Validation happens before any transport work.
        let Some(access_code) = self.access_code.clone() else {
            return Err(ValidationError::MissingAccessCode.into());
        };

        self.services.setup.reset();
        debug!("Starting activation attempt for card {}", card.card_id);

        let task = ActivationTask::new(
            &mut self.reader,
            card,
            access_code,
            challenge,
            self.services.clone(),
        );
        let outcome = task.run().await;

        // The session never outlives the attempt.
        self.reader.stop_session().await;

        outcome
    }
}

/// Cancels an in-flight activation attempt.
///
/// Cancellation is cooperative: the setup flag stops card setup between
/// steps and the supplier abandons its pending order fetch. The attempt
/// then winds down through its normal cancellation path.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    setup: CardSetupHandler,
    supplier: Arc<dyn OrderSupplier>,
}

impl CancelHandle {
    /// Requests cancellation of the running attempt.
    pub fn cancel(&self) {
        debug!("Cancellation requested for the running activation attempt");
        self.setup.cancel_card_setup();
        self.supplier.cancel();
    }
}

/// Clears the running flag when the attempt future completes or is
/// dropped.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
