//! Session events merged into the reader's single dispatch channel.

use tokio::sync::mpsc;

use crate::error::{NfcError, WatchdogKind};

/// An asynchronous signal affecting the active session.
///
/// Watchdog tasks and the platform driver feed these into one channel; the
/// reader consumes them at its next wait point. Whichever of "the awaited
/// operation finished" and "an event arrived" happens first wins that wait;
/// the loser is ignored for that wait.
#[derive(Debug)]
pub enum SessionEvent {
    /// A watchdog timer elapsed.
    WatchdogElapsed {
        /// Which watchdog fired
        kind: WatchdogKind,
        /// Arming epoch, used to discard fires from superseded watchdogs
        epoch: u64,
    },
    /// The platform invalidated the session asynchronously.
    Invalidated(NfcError),
}

/// Sending half of the session event channel.
///
/// A clone is handed to the driver at the start of each session. Drivers use
/// it to report invalidation that does not surface as the result of an
/// in-flight call, such as the user dismissing a platform scanning UI.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    pub(crate) const fn new(tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Pushes an event towards the reader.
    ///
    /// Dropped silently when the reader is gone.
    pub fn send(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}
