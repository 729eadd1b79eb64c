//! Configuration options for the contactless reader.

use std::time::Duration;

/// Default bound on one whole scanning session.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(59);

/// Default bound on a single tag connection.
pub const DEFAULT_TAG_TIMEOUT: Duration = Duration::from_secs(19);

/// Default number of transient-failure retries per connected tag.
pub const DEFAULT_RETRY_BUDGET: u32 = 20;

/// Configuration options for [`NfcReader`](crate::NfcReader).
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Watchdog bound on the whole session, armed at `start_session`
    pub session_timeout: Duration,
    /// Watchdog bound on one tag connection, armed at each connect
    pub tag_timeout: Duration,
    /// How many transient transport failures to retry against one tag
    /// before dropping it and restarting discovery
    pub retry_budget: u32,
    /// Message handed to the driver when the session ends, for drivers
    /// that surface a platform scanning UI
    pub halt_message: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            tag_timeout: DEFAULT_TAG_TIMEOUT,
            retry_budget: DEFAULT_RETRY_BUDGET,
            halt_message: None,
        }
    }
}

impl ReaderConfig {
    /// Create a new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session watchdog timeout
    #[must_use]
    pub const fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Set the per-tag watchdog timeout
    #[must_use]
    pub const fn with_tag_timeout(mut self, timeout: Duration) -> Self {
        self.tag_timeout = timeout;
        self
    }

    /// Set the transient-failure retry budget
    #[must_use]
    pub const fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Set the message shown when the session ends
    #[must_use]
    pub fn with_halt_message(mut self, message: impl Into<String>) -> Self {
        self.halt_message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.session_timeout, Duration::from_secs(59));
        assert_eq!(config.tag_timeout, Duration::from_secs(19));
        assert_eq!(config.retry_budget, 20);
        assert_eq!(config.halt_message, None);
    }

    #[test]
    fn test_builder() {
        let config = ReaderConfig::new()
            .with_session_timeout(Duration::from_secs(10))
            .with_tag_timeout(Duration::from_secs(3))
            .with_retry_budget(2)
            .with_halt_message("done");
        assert_eq!(config.session_timeout, Duration::from_secs(10));
        assert_eq!(config.tag_timeout, Duration::from_secs(3));
        assert_eq!(config.retry_budget, 2);
        assert_eq!(config.halt_message.as_deref(), Some("done"));
    }
}
