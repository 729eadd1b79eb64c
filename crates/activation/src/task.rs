use std::sync::Arc;

use bytes::Bytes;
use cardtap_nfc::{NfcError, NfcReader, TagDriver};
use sha2::{Digest, Sha256};
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::collaborators::{OrderSupplier, TokenExchange};
use crate::commands::{AttestKeyCommand, GenerateOtpCommand, SignHashCommand};
use crate::error::{BoxError, Error, Result};
use crate::otp_store::RootOtpStore;
use crate::setup::{CardSetupHandler, SetupOutcome};
use crate::types::{
    AccessCode, ActivationOrder, ActivationOutcome, Card, EllipticCurve, RootOtp,
    VisaCardActivationResponse,
};

/// External collaborators one activation attempt needs.
#[derive(Debug, Clone)]
pub struct ActivationServices {
    /// Supplies the activation order to sign.
    pub order_supplier: Arc<dyn OrderSupplier>,
    /// Redeems challenge attestations for credentials.
    pub token_exchange: Arc<dyn TokenExchange>,
    /// Root OTP persistence.
    pub otp_store: RootOtpStore,
    /// Card setup steps and their cancellation flag.
    pub setup: CardSetupHandler,
}

/// One card activation attempt.
///
/// Drives the card through challenge attestation (when a challenge is
/// given), setup, OTP generation and order signing, overlapping the
/// network-bound order fetch with the NFC-bound card commands. The task
/// borrows the reader exclusively; the caller closes the session once
/// [`run`](Self::run) returns, whatever the outcome.
#[derive(Debug)]
pub struct ActivationTask<'r, D: TagDriver> {
    reader: &'r mut NfcReader<D>,
    card: Card,
    access_code: AccessCode,
    challenge: Option<String>,
    services: ActivationServices,
    order_rx: Option<oneshot::Receiver<std::result::Result<ActivationOrder, BoxError>>>,
    order_started: bool,
}

impl<'r, D: TagDriver> ActivationTask<'r, D> {
    /// Creates a task for one attempt against `card`.
    ///
    /// `challenge` is the authorization challenge to prove card possession
    /// with, when the backend demands re-authorization.
    pub fn new(
        reader: &'r mut NfcReader<D>,
        card: Card,
        access_code: AccessCode,
        challenge: Option<String>,
        services: ActivationServices,
    ) -> Self {
        Self {
            reader,
            card,
            access_code,
            challenge,
            services,
            order_rx: None,
            order_started: false,
        }
    }

    /// Runs the attempt to its terminal state.
    ///
    /// User cancellation is not an error: it yields
    /// [`ActivationOutcome::Cancelled`] so the caller can drop the attempt
    /// without reporting a failure.
    ///
    /// # Errors
    ///
    /// Any non-cancellation failure of a step, with transport, protocol,
    /// collaborator and invariant causes kept distinct.
    pub async fn run(mut self) -> Result<ActivationOutcome> {
        match self.run_inner().await {
            Ok(response) => {
                debug!("Card activation completed for card {}", self.card.card_id);
                Ok(ActivationOutcome::Completed(response))
            }
            Err(StepError::Cancelled) => {
                debug!("Card activation cancelled by the user");
                Ok(ActivationOutcome::Cancelled)
            }
            Err(StepError::Failed(error)) => Err(error),
        }
    }

    async fn run_inner(&mut self) -> std::result::Result<VisaCardActivationResponse, StepError> {
        self.reader.start_session().await?;
        self.reader.connect().await?;

        if let Some(challenge) = self.challenge.take() {
            self.sign_challenge(&challenge).await?;
        }
        // Safe to fetch now: either no authorization was needed or it just
        // succeeded. The network round-trip overlaps the card commands
        // below until the rendezvous.
        self.start_order_fetch();

        let setup = &self.services.setup;
        match setup.setup_card(self.reader, &mut self.card, &self.access_code).await? {
            SetupOutcome::Completed => {}
            SetupOutcome::Cancelled => return Err(StepError::Cancelled),
        }

        let otp = self.generate_otp().await?;
        self.services.otp_store.put(&self.card.card_id, &otp).await?;

        let order = self.wait_for_order().await?;
        let (signed_by_card, signed_by_wallet) = self.sign_order(&order).await?;

        let response = VisaCardActivationResponse::builder()
            .with_signed_order_by_card(signed_by_card)
            .with_signed_order_by_wallet(signed_by_wallet)
            .with_root_otp(otp)
            .build()?;
        Ok(response)
    }

    /// Proves card possession by signing the challenge with the card
    /// identity key, then redeems the attestation with the token exchange.
    async fn sign_challenge(&mut self, challenge: &str) -> std::result::Result<(), StepError> {
        debug!("Signing authorization challenge with the card identity key");
        let digest: [u8; 32] = Sha256::digest(challenge.as_bytes()).into();

        let attest = AttestKeyCommand::with_digest(&digest);
        let response = self.reader.send(attest.command()).await?;
        let attestation = AttestKeyCommand::parse_response(&response).map_err(Error::from)?;

        self.services
            .token_exchange
            .exchange(&attestation.signature, &attestation.salt)
            .await
            .map_err(|cause| StepError::Failed(Error::TokenExchange(cause)))?;
        debug!("Token exchange accepted the challenge attestation");
        Ok(())
    }

    /// Spawns the order fetch once; later calls are no-ops.
    fn start_order_fetch(&mut self) {
        if self.order_started {
            return;
        }
        self.order_started = true;

        let supplier = Arc::clone(&self.services.order_supplier);
        let (tx, rx) = oneshot::channel();
        self.order_rx = Some(rx);

        tokio::spawn(async move {
            let result = supplier.provide_order().await;
            // The receiver is gone once the attempt has finished; a late
            // order is discarded here.
            let _ = tx.send(result);
        });
        debug!("Order fetch running in the background");
    }

    async fn generate_otp(&mut self) -> std::result::Result<RootOtp, StepError> {
        let generate = GenerateOtpCommand::request();
        let response = self.reader.send(generate.command()).await?;
        let otp = GenerateOtpCommand::parse_response(&response).map_err(Error::from)?;
        debug!("Root OTP generated on card {}", self.card.card_id);
        Ok(otp)
    }

    /// Takes the single-slot order rendezvous, blocking until the
    /// background fetch fills it or the session dies.
    ///
    /// The slot is read-once: the receiver is consumed here, and a second
    /// call is an invariant violation. Racing against session invalidation
    /// bounds the wait by the session watchdog, so an order that never
    /// arrives cannot hang the task.
    async fn wait_for_order(&mut self) -> std::result::Result<ActivationOrder, StepError> {
        let Some(order_rx) = self.order_rx.take() else {
            error!("Order rendezvous consumed twice");
            return Err(StepError::Failed(Error::Invariant(
                "order rendezvous already consumed",
            )));
        };

        tokio::select! {
            received = order_rx => match received {
                Ok(Ok(order)) => {
                    debug!("Activation order available for signing");
                    Ok(order)
                }
                Ok(Err(cause)) => Err(StepError::Failed(Error::OrderSupplier(cause))),
                Err(closed) => Err(StepError::Failed(Error::OrderSupplier(Box::new(closed)))),
            },
            reason = self.reader.await_invalidation() => Err(StepError::from(reason)),
        }
    }

    /// Signs the order digest twice over the same connection: once with the
    /// card identity key, once with the mandatory-curve wallet key.
    async fn sign_order(
        &mut self,
        order: &ActivationOrder,
    ) -> std::result::Result<(Bytes, Bytes), StepError> {
        let digest = order.digest();

        let attest = AttestKeyCommand::with_digest(&digest);
        let response = self.reader.send(attest.command()).await?;
        let attestation = AttestKeyCommand::parse_response(&response).map_err(Error::from)?;
        let signed_by_card = attestation.signature;
        debug!("Order signed by card key: {}", hex::encode(&signed_by_card));

        let Some(wallet) = self.card.wallet_for(EllipticCurve::MANDATORY) else {
            error!(
                "No {} wallet on card {} although setup confirmed one",
                EllipticCurve::MANDATORY,
                self.card.card_id
            );
            return Err(StepError::Failed(Error::Invariant(
                "signing wallet not found after creation confirmed",
            )));
        };
        let sign = SignHashCommand::with_wallet_and_digest(wallet, &digest)?;
        let response = self.reader.send(sign.command()).await?;
        let signed_by_wallet = SignHashCommand::parse_response(&response).map_err(Error::from)?;
        debug!("Order signed by wallet key: {}", hex::encode(&signed_by_wallet));

        Ok((signed_by_card, signed_by_wallet))
    }
}

/// Step outcome separating the user backing out from genuine failures.
enum StepError {
    Cancelled,
    Failed(Error),
}

impl From<Error> for StepError {
    fn from(error: Error) -> Self {
        match error {
            Error::Nfc(NfcError::UserCancelled) => Self::Cancelled,
            other => Self::Failed(other),
        }
    }
}

impl From<NfcError> for StepError {
    fn from(error: NfcError) -> Self {
        Self::from(Error::from(error))
    }
}
