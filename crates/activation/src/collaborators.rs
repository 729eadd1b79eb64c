use std::fmt;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::types::ActivationOrder;

/// Source of the activation order that the card and wallet must both sign.
///
/// Implementations typically poll a backend until the order document is
/// released. [`OrderSupplier::cancel`] asks an in-flight
/// [`provide_order`](OrderSupplier::provide_order) call to give up early;
/// it must be safe to call from another task at any time.
#[async_trait]
pub trait OrderSupplier: Send + Sync + fmt::Debug {
    /// Resolves the activation order, waiting for it if necessary.
    async fn provide_order(&self) -> Result<ActivationOrder, BoxError>;

    /// Requests that any in-flight [`provide_order`](Self::provide_order)
    /// call stop waiting.
    fn cancel(&self);
}

/// Redeems a card-key attestation for fresh backend credentials.
#[async_trait]
pub trait TokenExchange: Send + Sync + fmt::Debug {
    /// Presents the attestation signature and its salt to the backend.
    async fn exchange(&self, signature: &[u8], salt: &[u8]) -> Result<(), BoxError>;
}

/// Keyed secret storage backing the root OTP persistence.
///
/// A missing key is `Ok(None)`; `Err` is reserved for storage failures.
#[async_trait]
pub trait SecureStore: Send + Sync + fmt::Debug {
    /// Fetches the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), BoxError>;

    /// Removes the value stored under `key`. Removing an absent key is not
    /// an error.
    async fn delete(&self, key: &str) -> Result<(), BoxError>;
}
