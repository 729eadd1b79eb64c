use std::sync::Arc;

use tracing::debug;

use crate::collaborators::SecureStore;
use crate::constants::OTP_KEY_PREFIX;
use crate::error::{Error, Result};
use crate::types::RootOtp;

/// Root OTP persistence on top of a [`SecureStore`].
///
/// Values are keyed by card identifier under a fixed prefix, so one store
/// can hold the OTP of every card the application has activated.
#[derive(Debug, Clone)]
pub struct RootOtpStore {
    store: Arc<dyn SecureStore>,
}

impl RootOtpStore {
    /// Wraps a secure store.
    #[must_use]
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store }
    }

    fn key(card_id: &str) -> String {
        format!("{OTP_KEY_PREFIX}{card_id}")
    }

    /// Fetches the stored OTP for `card_id`, if any.
    ///
    /// # Errors
    ///
    /// Fails only on storage failure; an absent OTP is `Ok(None)`.
    pub async fn get(&self, card_id: &str) -> Result<Option<RootOtp>> {
        let value = self.store.get(&Self::key(card_id)).await.map_err(Error::SecureStore)?;
        Ok(value.map(RootOtp::new))
    }

    /// Returns whether an OTP is stored for `card_id`.
    ///
    /// # Errors
    ///
    /// Fails only on storage failure.
    pub async fn has(&self, card_id: &str) -> Result<bool> {
        Ok(self.get(card_id).await?.is_some())
    }

    /// Stores `otp` for `card_id`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Fails on storage failure.
    pub async fn put(&self, card_id: &str, otp: &RootOtp) -> Result<()> {
        debug!("Storing root OTP for card {}", card_id);
        self.store.put(&Self::key(card_id), otp.as_bytes()).await.map_err(Error::SecureStore)
    }

    /// Removes the OTP stored for `card_id`, if any.
    ///
    /// # Errors
    ///
    /// Fails on storage failure.
    pub async fn delete(&self, card_id: &str) -> Result<()> {
        debug!("Deleting root OTP for card {}", card_id);
        self.store.delete(&Self::key(card_id)).await.map_err(Error::SecureStore)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    // Shadows the crate's single-argument `Result` alias pulled in by the
    // glob import; the `SecureStore` trait uses the two-argument form.
    use std::result::Result;

    use async_trait::async_trait;

    use super::*;
    use crate::error::BoxError;

    #[derive(Debug, Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, Vec<u8>>>,
        fail: bool,
    }

    #[async_trait]
    impl SecureStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError> {
            if self.fail {
                return Err("store offline".into());
            }
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn put(&self, key: &str, value: &[u8]) -> Result<(), BoxError> {
            if self.fail {
                return Err("store offline".into());
            }
            self.entries.lock().unwrap().insert(key.to_owned(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), BoxError> {
            if self.fail {
                return Err("store offline".into());
            }
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_put_get_delete_round_trip() {
        let memory = Arc::new(MemoryStore::default());
        let store = RootOtpStore::new(memory.clone());
        let otp = RootOtp::new(vec![0xAA; 32]);

        assert!(!store.has("card-1").await.unwrap());

        store.put("card-1", &otp).await.unwrap();
        assert!(store.has("card-1").await.unwrap());
        assert_eq!(store.get("card-1").await.unwrap().unwrap().as_bytes(), otp.as_bytes());

        // The backing key carries the prefix.
        assert!(memory.entries.lock().unwrap().contains_key("otp_card-1"));

        store.delete("card-1").await.unwrap();
        assert!(!store.has("card-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_absent_key_is_not_an_error() {
        let store = RootOtpStore::new(Arc::new(MemoryStore::default()));
        assert!(store.get("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_maps_to_secure_store_error() {
        let store = RootOtpStore::new(Arc::new(MemoryStore { fail: true, ..Default::default() }));
        assert!(matches!(store.get("card-1").await, Err(Error::SecureStore(_))));
        assert!(matches!(
            store.put("card-1", &RootOtp::new(vec![0x01; 16])).await,
            Err(Error::SecureStore(_))
        ));
    }
}
