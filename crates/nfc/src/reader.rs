//! The contactless reader session manager.

use std::future::Future;

use cardtap_apdu::{Command, Response};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

use crate::config::ReaderConfig;
use crate::driver::{TagChannel, TagDriver};
use crate::error::{NfcError, WatchdogKind};
use crate::event::{EventSender, SessionEvent};

/// Lifecycle of the reader's single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session is active
    Closed,
    /// A session is active and the driver is discovering tags
    Polling,
    /// A tag is connected and ready for commands
    TagConnected,
}

/// Manages the single channel through which APDUs reach a physical card.
///
/// The reader owns the session lifecycle end to end: it starts and stops
/// platform sessions, waits for a tag, transmits command APDUs and applies
/// the recovery policy for a contactless medium, where the card can slip
/// out of the field at any moment.
///
/// Two watchdog timers bound every session. The session watchdog is armed
/// by [`start_session`](Self::start_session) and caps the whole interaction;
/// the tag watchdog is re-armed on every tag connection and caps how long
/// one tag may be worked with. Each runs as a spawned sleep task that fires
/// an event into the reader's session channel, so a wait on the driver and
/// a watchdog expiry meet at one `select` point and the first to arrive
/// wins.
///
/// Transient faults during an exchange are retried against the same tag up
/// to the configured budget. When the budget runs out the reader drops the
/// tag and resumes discovery instead of failing the session, which recovers
/// from a card moved slightly out of range mid-operation. The budget refills
/// on every new tag connection and on every successful exchange.
///
/// At most one command is in flight at a time; `&mut self` receivers make
/// overlapping calls unrepresentable.
#[derive(Debug)]
pub struct NfcReader<D: TagDriver> {
    driver: D,
    config: ReaderConfig,
    state: SessionState,
    channel: Option<D::Channel>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    session_watchdog: Option<JoinHandle<()>>,
    tag_watchdog: Option<JoinHandle<()>>,
    session_epoch: u64,
    tag_epoch: Option<u64>,
    next_epoch: u64,
    retries_left: u32,
}

impl<D: TagDriver> NfcReader<D> {
    /// Creates a reader over the given driver with default configuration.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, ReaderConfig::default())
    }

    /// Creates a reader over the given driver with the given configuration.
    pub fn with_config(driver: D, config: ReaderConfig) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        let retries_left = config.retry_budget;
        Self {
            driver,
            config,
            state: SessionState::Closed,
            channel: None,
            events,
            events_tx,
            session_watchdog: None,
            tag_watchdog: None,
            session_epoch: 0,
            tag_epoch: None,
            next_epoch: 0,
            retries_left,
        }
    }

    /// Returns the current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the reader configuration.
    #[must_use]
    pub const fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Starts a scanning session and arms the session watchdog.
    ///
    /// No-op when a session is already active.
    ///
    /// # Errors
    ///
    /// Propagates driver failures to begin platform polling.
    pub async fn start_session(&mut self) -> Result<(), NfcError> {
        if self.state != SessionState::Closed {
            trace!("session already active");
            return Ok(());
        }

        // Leftover events from a previous session are meaningless now.
        while self.events.try_recv().is_ok() {}

        self.driver.begin_polling(EventSender::new(self.events_tx.clone())).await?;
        self.state = SessionState::Polling;
        self.retries_left = self.config.retry_budget;
        self.arm_session_watchdog();
        debug!(timeout = ?self.config.session_timeout, "session started");
        Ok(())
    }

    /// Ends the session, if one is active.
    ///
    /// Safe to call when already closed. Both watchdogs are disarmed and the
    /// driver is told to end the platform session.
    pub async fn stop_session(&mut self) {
        if self.state == SessionState::Closed {
            trace!("stop requested with no active session");
            return;
        }
        self.teardown().await;
    }

    /// Waits until a tag is connected.
    ///
    /// On connection the tag watchdog is armed and the retry budget refills.
    /// Returns immediately when a tag is already connected.
    ///
    /// # Errors
    ///
    /// Fails with [`NfcError::NoSession`] when no session is active, with a
    /// timeout when a watchdog elapses first, or with whatever fatal fault
    /// the driver reports. Any failure closes the session.
    pub async fn connect(&mut self) -> Result<(), NfcError> {
        match self.state {
            SessionState::Closed => return Err(NfcError::NoSession),
            SessionState::TagConnected => return Ok(()),
            SessionState::Polling => {}
        }

        loop {
            let outcome = guarded_wait(
                &mut self.events,
                self.session_epoch,
                self.tag_epoch,
                self.driver.await_tag(),
            )
            .await;

            match outcome {
                WaitOutcome::Fatal(reason) => return Err(self.invalidate(reason).await),
                WaitOutcome::Done(Ok(channel)) => {
                    self.channel = Some(channel);
                    self.state = SessionState::TagConnected;
                    self.retries_left = self.config.retry_budget;
                    self.arm_tag_watchdog();
                    debug!("tag connected");
                    return Ok(());
                }
                WaitOutcome::Done(Err(err)) if err.is_transient() => {
                    trace!(%err, "tag discovery glitch, still polling");
                }
                WaitOutcome::Done(Err(err)) => return Err(self.invalidate(err).await),
            }
        }
    }

    /// Transmits one command APDU and awaits the parsed response.
    ///
    /// Requires a connected tag. Transient faults are retried against the
    /// same tag; once the budget is exhausted the reader restarts discovery,
    /// waits for the next tag and resends, all within this call. Non-success
    /// status words are not errors here, they are returned in the
    /// [`Response`] for the protocol layer to interpret.
    ///
    /// # Errors
    ///
    /// Fails with [`NfcError::NoSession`] or [`NfcError::NotConnected`] when
    /// called in the wrong state, or with the fault that invalidated the
    /// session (watchdog expiry, platform invalidation, user cancellation,
    /// non-transient transport fault).
    #[instrument(level = "trace", skip_all, fields(ins = command.ins()))]
    pub async fn send(&mut self, command: &Command) -> Result<Response, NfcError> {
        loop {
            match self.state {
                SessionState::Closed => return Err(NfcError::NoSession),
                SessionState::Polling => return Err(NfcError::NotConnected),
                SessionState::TagConnected => {}
            }

            let payload = command.to_bytes();
            trace!(command = %hex::encode(&payload), "transmitting");

            let Some(channel) = self.channel.as_mut() else {
                return Err(NfcError::NotConnected);
            };
            let outcome = guarded_wait(
                &mut self.events,
                self.session_epoch,
                self.tag_epoch,
                channel.transceive(&payload),
            )
            .await;

            let result = match outcome {
                WaitOutcome::Fatal(reason) => return Err(self.invalidate(reason).await),
                WaitOutcome::Done(Ok(raw)) => Response::from_bytes(&raw).map_err(NfcError::from),
                WaitOutcome::Done(Err(err)) => Err(err),
            };

            match result {
                Ok(response) => {
                    trace!(status = %response.status(), "response received");
                    self.retries_left = self.config.retry_budget;
                    return Ok(response);
                }
                Err(err) if err.is_transient() => {
                    self.retries_left = self.retries_left.saturating_sub(1);
                    if self.retries_left > 0 {
                        trace!(%err, retries_left = self.retries_left, "transient fault, retrying");
                        continue;
                    }
                    warn!(%err, "retry budget exhausted, dropping tag to re-discover");
                    if let Err(err) = self.restart_polling().await {
                        return Err(self.invalidate(err).await);
                    }
                    self.connect().await?;
                    // Fresh tag: go around and resend the same command.
                }
                Err(err) => return Err(self.invalidate(err).await),
            }
        }
    }

    /// Drops the current tag and re-enters discovery.
    ///
    /// The tag watchdog is disarmed; the session watchdog keeps running.
    ///
    /// # Errors
    ///
    /// Fails with [`NfcError::NoSession`] when no session is active, or with
    /// a driver fault while resuming discovery.
    pub async fn restart_polling(&mut self) -> Result<(), NfcError> {
        if self.state == SessionState::Closed {
            return Err(NfcError::NoSession);
        }
        self.disarm_tag_watchdog();
        self.channel = None;
        self.state = SessionState::Polling;
        self.driver.restart_polling().await?;
        debug!("discovery restarted");
        Ok(())
    }

    /// Waits until the session fails and returns the reason.
    ///
    /// Resolves when a watchdog elapses or the driver pushes an
    /// invalidation, so a wait on something other than the card, such as a
    /// background fetch, can be raced against the session's lifetime
    /// instead of hanging past it.
    ///
    /// The reader is not torn down here. There is no await point between
    /// consuming the deciding event and returning, so the future can be
    /// dropped by a `select!` at any time without losing an event or
    /// leaving teardown half-done; the caller closes the session as usual.
    ///
    /// Returns [`NfcError::NoSession`] immediately when no session is
    /// active.
    pub async fn await_invalidation(&mut self) -> NfcError {
        if self.state == SessionState::Closed {
            return NfcError::NoSession;
        }
        loop {
            let event = self.events.recv().await;
            if let Some(reason) = classify(event, self.session_epoch, self.tag_epoch) {
                warn!(%reason, "session failed while waiting");
                return reason;
            }
        }
    }

    /// Closes the session and hands the reason back to the caller.
    async fn invalidate(&mut self, reason: NfcError) -> NfcError {
        warn!(%reason, "session invalidated");
        self.teardown().await;
        reason
    }

    async fn teardown(&mut self) {
        if let Some(task) = self.session_watchdog.take() {
            task.abort();
        }
        self.disarm_tag_watchdog();
        self.channel = None;
        self.state = SessionState::Closed;
        if let Err(err) = self.driver.end_session(self.config.halt_message.as_deref()).await {
            warn!(%err, "driver reported an error while ending the session");
        }
        debug!("session closed");
    }

    fn arm_session_watchdog(&mut self) {
        if let Some(task) = self.session_watchdog.take() {
            task.abort();
        }
        let epoch = self.issue_epoch();
        self.session_epoch = epoch;
        self.session_watchdog =
            Some(spawn_watchdog(WatchdogKind::Session, self.config.session_timeout, epoch, {
                EventSender::new(self.events_tx.clone())
            }));
    }

    fn arm_tag_watchdog(&mut self) {
        self.disarm_tag_watchdog();
        let epoch = self.issue_epoch();
        self.tag_epoch = Some(epoch);
        self.tag_watchdog = Some(spawn_watchdog(WatchdogKind::Tag, self.config.tag_timeout, epoch, {
            EventSender::new(self.events_tx.clone())
        }));
    }

    fn disarm_tag_watchdog(&mut self) {
        if let Some(task) = self.tag_watchdog.take() {
            task.abort();
        }
        self.tag_epoch = None;
    }

    fn issue_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }
}

impl<D: TagDriver> Drop for NfcReader<D> {
    fn drop(&mut self) {
        if let Some(task) = self.session_watchdog.take() {
            task.abort();
        }
        if let Some(task) = self.tag_watchdog.take() {
            task.abort();
        }
    }
}

fn spawn_watchdog(
    kind: WatchdogKind,
    timeout: std::time::Duration,
    epoch: u64,
    events: EventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        events.send(SessionEvent::WatchdogElapsed { kind, epoch });
    })
}

enum WaitOutcome<T> {
    Done(T),
    Fatal(NfcError),
}

/// Awaits `fut` while watching the session channel.
///
/// The first of the two to produce something wins. Stale watchdog fires,
/// recognized by an epoch that no longer matches, are discarded without
/// disturbing the in-flight future.
async fn guarded_wait<T>(
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    session_epoch: u64,
    tag_epoch: Option<u64>,
    fut: impl Future<Output = T>,
) -> WaitOutcome<T> {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            event = events.recv() => {
                if let Some(reason) = classify(event, session_epoch, tag_epoch) {
                    return WaitOutcome::Fatal(reason);
                }
            }
            value = &mut fut => return WaitOutcome::Done(value),
        }
    }
}

fn classify(
    event: Option<SessionEvent>,
    session_epoch: u64,
    tag_epoch: Option<u64>,
) -> Option<NfcError> {
    match event {
        // The reader holds a sender for its own watchdogs, so the channel
        // cannot close while the reader is alive.
        None => Some(NfcError::SessionInvalidated("event channel closed".into())),
        Some(SessionEvent::Invalidated(reason)) => Some(reason),
        Some(SessionEvent::WatchdogElapsed { kind: WatchdogKind::Session, epoch }) => {
            (epoch == session_epoch).then_some(NfcError::Timeout(WatchdogKind::Session))
        }
        Some(SessionEvent::WatchdogElapsed { kind: WatchdogKind::Tag, epoch }) => {
            (tag_epoch == Some(epoch)).then_some(NfcError::Timeout(WatchdogKind::Tag))
        }
    }
}
