//! Settings snapshot over the host key-value store.
//!
//! Feature flags are never read as ambient globals inside the core:
//! subsystems take an explicit snapshot at entry, and the embedding
//! shell folds store change notifications back into it.

use crate::classify::CategoryCache;
use crate::store::KeyValueStore;
use hopper_types::{PopupMode, ScrollDirection, StoreChange, keys};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Explicit configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Opaque theme id; theming itself is out of scope.
    pub appearance: Option<String>,
    pub popup: PopupMode,
    pub scroll: ScrollDirection,
    pub api_key: Option<String>,
    pub categorization_enabled: bool,
}

impl Settings {
    /// Batch-read all recognized keys; absent keys take defaults. A
    /// store failure logs and falls back to defaults.
    pub async fn load(store: &Arc<dyn KeyValueStore>) -> Self {
        let all_keys = [
            keys::APPEARANCE,
            keys::POPUP_WINDOW,
            keys::SCROLL,
            keys::OPENAI_KEY,
            keys::ENABLE_CATEGORIZATION,
        ];

        let values = match store.get(&all_keys).await {
            Ok(values) => values,
            Err(e) => {
                warn!("Settings read failed, using defaults: {e}");
                HashMap::new()
            }
        };

        let mut settings = Self::default();
        for (key, value) in &values {
            settings.apply_change(key, value);
        }
        settings
    }

    /// Fold one change-notification entry into the snapshot. Unknown
    /// keys are ignored.
    pub fn apply_change(&mut self, key: &str, value: &Value) {
        match key {
            keys::APPEARANCE => self.appearance = value.as_str().map(String::from),
            keys::POPUP_WINDOW => {
                if let Ok(popup) = serde_json::from_value::<PopupMode>(value.clone()) {
                    self.popup = popup;
                }
            }
            keys::SCROLL => {
                if let Ok(scroll) = serde_json::from_value::<ScrollDirection>(value.clone()) {
                    self.scroll = scroll;
                }
            }
            keys::OPENAI_KEY => self.api_key = value.as_str().map(String::from),
            keys::ENABLE_CATEGORIZATION => {
                self.categorization_enabled = value.as_bool().unwrap_or(false);
            }
            _ => debug!("Ignoring unrecognized settings key: {key}"),
        }
    }

    /// Fold a change-notification batch.
    pub fn apply_changes(&mut self, changes: &[StoreChange]) {
        for change in changes {
            self.apply_change(&change.key, &change.new_value);
        }
    }
}

/// Write the categorization toggle through the store. Turning the
/// feature off also clears every cached category blob so stale labels
/// cannot resurface if the feature comes back later with a fresh key.
///
/// # Errors
///
/// Returns an error when the store write fails.
pub async fn set_categorization_enabled(
    store: &Arc<dyn KeyValueStore>,
    enabled: bool,
) -> crate::Result<()> {
    let mut entries = HashMap::new();
    entries.insert(keys::ENABLE_CATEGORIZATION.to_string(), Value::Bool(enabled));
    store.set(entries).await?;

    if !enabled {
        CategoryCache::new(Arc::clone(store)).invalidate_all().await;
    }
    Ok(())
}

/// Write the classifier API key through the store.
///
/// # Errors
///
/// Returns an error when the store write fails.
pub async fn set_api_key(store: &Arc<dyn KeyValueStore>, api_key: &str) -> crate::Result<()> {
    let mut entries = HashMap::new();
    entries.insert(
        keys::OPENAI_KEY.to_string(),
        Value::String(api_key.to_string()),
    );
    store.set(entries).await
}
