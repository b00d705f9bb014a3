//! Abstract host key-value store.
//!
//! The palette never touches browser storage directly; the embedding
//! shell implements this trait over whatever the host provides. Change
//! notifications arrive from the host as [`StoreChange`] batches and
//! are folded into the settings snapshot by the config layer.
//!
//! [`StoreChange`]: hopper_types::StoreChange

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Async key-value collaborator backing settings and category caches.
///
/// Implementations report failures as [`crate::Error::Store`]; callers
/// on the search path absorb them (caching and settings are
/// best-effort, never fatal).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a batch of keys. Absent keys are simply missing from the
    /// returned map.
    ///
    /// # Errors
    ///
    /// Returns an error when the host storage backend fails.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>>;

    /// Write a batch of entries, overwriting existing values.
    ///
    /// # Errors
    ///
    /// Returns an error when the host storage backend fails.
    async fn set(&self, entries: HashMap<String, Value>) -> Result<()>;

    /// Remove a batch of keys. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the host storage backend fails.
    async fn remove(&self, keys: &[&str]) -> Result<()>;
}
