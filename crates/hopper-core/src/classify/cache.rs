use crate::error::Error;
use crate::store::KeyValueStore;
use crate::utils::now_millis;
use hopper_types::{Category, CategoryCacheEntry, SourceType};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cached labels stay valid for 15 minutes.
const CACHE_TTL_MS: u64 = 15 * 60 * 1000;

type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Scoped category cache over the host key-value store, one entry per
/// source type.
///
/// Every operation is best-effort: store failures are logged and
/// reported as a miss or a no-op so the search path never blocks on
/// caching.
pub struct CategoryCache {
    store: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl CategoryCache {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(now_millis),
        }
    }

    /// Replace the time source (TTL tests drive a manual clock).
    #[cfg(test)]
    #[must_use]
    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Read the scoped entry for `source`.
    ///
    /// An entry past the TTL is deleted from the store, not merely
    /// skipped, so a later write always starts fresh.
    pub async fn get(&self, source: SourceType) -> Option<HashMap<String, Category>> {
        let key = source.cache_key();

        let values = match self.store.get(&[key]).await {
            Ok(values) => values,
            Err(e) => {
                warn!("{}", Error::CacheRead(format!("{source}: {e}")));
                return None;
            }
        };

        let raw = values.get(key)?;
        let entry: CategoryCacheEntry = match serde_json::from_value(raw.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("{}", Error::CacheRead(format!("{source}: {e}")));
                return None;
            }
        };

        let now = (self.clock)();
        if now.saturating_sub(entry.timestamp_ms) > CACHE_TTL_MS {
            debug!("Category cache for {source} expired, evicting");
            if let Err(e) = self.store.remove(&[key]).await {
                warn!("Failed to evict expired category cache for {source}: {e}");
            }
            return None;
        }

        debug!(
            "Category cache hit for {source} ({} urls)",
            entry.categories.len()
        );
        Some(entry.categories)
    }

    /// Overwrite the scoped entry for `source`. Write failures log and
    /// no-op.
    pub async fn set(&self, source: SourceType, categories: HashMap<String, Category>) {
        let entry = CategoryCacheEntry {
            timestamp_ms: (self.clock)(),
            categories,
            source_type: source,
        };

        let value = match serde_json::to_value(&entry) {
            Ok(value) => value,
            Err(e) => {
                warn!("{}", Error::CacheWrite(format!("{source}: {e}")));
                return;
            }
        };

        let mut entries = HashMap::new();
        entries.insert(source.cache_key().to_string(), value);

        if let Err(e) = self.store.set(entries).await {
            warn!("{}", Error::CacheWrite(format!("{source}: {e}")));
        }
    }

    /// Remove every scoped entry so stale labels cannot resurface when
    /// the feature is re-enabled later.
    pub async fn invalidate_all(&self) {
        let keys: Vec<&str> = SourceType::ALL.iter().map(|s| s.cache_key()).collect();
        if let Err(e) = self.store.remove(&keys).await {
            warn!("Failed to clear category caches: {e}");
        }
    }
}
