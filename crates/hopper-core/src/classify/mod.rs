//! Topic labeling of search results.
//!
//! The orchestrator decides cache-hit / cache-miss / feature-disabled /
//! misconfigured-key and merges labels onto items. Nothing in this
//! module may surface an error to the UI; the worst case is unlabeled
//! results.

mod cache;
mod client;

pub use cache::CategoryCache;
pub use client::{Classifier, ClassifierClient};

use crate::error::{Error, Result};
use crate::store::KeyValueStore;
use hopper_types::{Category, CategoryGroup, RequestItem, SearchItem, SourceType, keys};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Categorizer {
    store: Arc<dyn KeyValueStore>,
    cache: CategoryCache,
    classifier: Arc<dyn Classifier>,
}

impl Categorizer {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        cache: CategoryCache,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            store,
            cache,
            classifier,
        }
    }

    /// Label `items` for `source`. Never raises: on any internal
    /// failure the items come back unmodified.
    pub async fn categorize(
        &self,
        mut items: Vec<SearchItem>,
        source: SourceType,
    ) -> Vec<SearchItem> {
        match self.resolve_labels(&items, source).await {
            Ok(Some(labels)) => merge_labels(&mut items, &labels),
            Ok(None) => {}
            Err(e) => warn!("Categorization failed for {source}: {e}"),
        }
        items
    }

    /// The decision sequence: feature flags, then cache, then one
    /// batched classifier call. `Ok(None)` means labeling is off.
    async fn resolve_labels(
        &self,
        items: &[SearchItem],
        source: SourceType,
    ) -> Result<Option<HashMap<String, Category>>> {
        let settings = self
            .store
            .get(&[keys::ENABLE_CATEGORIZATION, keys::OPENAI_KEY])
            .await?;

        let enabled = settings
            .get(keys::ENABLE_CATEGORIZATION)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !enabled {
            return Ok(None);
        }

        let api_key = settings
            .get(keys::OPENAI_KEY)
            .and_then(Value::as_str)
            .unwrap_or("");
        if !ClassifierClient::is_valid_key(api_key) {
            return Err(Error::InvalidApiKey);
        }

        if let Some(cached) = self.cache.get(source).await {
            return Ok(Some(cached));
        }

        if items.is_empty() {
            return Ok(None);
        }

        let batch: Vec<RequestItem> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| RequestItem {
                idx,
                title: item.title.clone(),
                url: item.url.clone(),
            })
            .collect();

        let assignments = self.classifier.classify(api_key, &batch).await?;

        let mut labels = HashMap::new();
        for assignment in assignments {
            // Response indices outside the request bounds are dropped
            if let Some(item) = items.get(assignment.idx) {
                labels.insert(item.url.clone(), assignment.category);
            }
        }

        debug!(
            "Classified {} urls for {source} ({} items)",
            labels.len(),
            items.len()
        );

        self.cache.set(source, labels.clone()).await;
        Ok(Some(labels))
    }
}

/// Merge labels onto items by URL; unmatched URLs default to Other.
fn merge_labels(items: &mut [SearchItem], labels: &HashMap<String, Category>) {
    for item in items {
        item.category = Some(labels.get(&item.url).copied().unwrap_or(Category::Other));
    }
}

/// Group items by category in the fixed priority order; categories
/// with zero items are omitted.
#[must_use]
pub fn group_by_category(items: &[SearchItem]) -> Vec<CategoryGroup> {
    let mut groups: HashMap<Category, Vec<SearchItem>> = HashMap::new();
    for item in items {
        groups
            .entry(item.category.unwrap_or(Category::Other))
            .or_default()
            .push(item.clone());
    }

    Category::GROUP_ORDER
        .iter()
        .filter_map(|category| {
            groups.remove(category).map(|items| CategoryGroup {
                category: *category,
                items,
            })
        })
        .collect()
}
