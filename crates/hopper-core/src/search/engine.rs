use hopper_types::SearchItem;
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use tracing::debug;

/// Fuzzy ranking engine using nucleo
pub struct SearchEngine {
    matcher: Matcher,
    config: SearchConfig,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Minimum combined score for an item to stay in the results
    pub threshold: f64,

    /// Weight for title matches
    pub title_weight: f64,

    /// Weight for URL matches
    pub url_weight: f64,

    /// Weight for the tab ordinal (`display_key`)
    pub key_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0, // Use raw nucleo scores, no threshold
            title_weight: 1.0,
            url_weight: 0.5,
            key_weight: 0.3,
        }
    }
}

impl SearchEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            config: SearchConfig::default(),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            config,
        }
    }

    /// Rank `items` against `query`.
    ///
    /// An empty query is the identity ranking: items come back in their
    /// given order with `idx` reassigned to array position. A non-empty
    /// query keeps only items that clear the relevance threshold,
    /// best-first; equal scores preserve the original relative order.
    pub fn rank(&mut self, items: Vec<SearchItem>, query: &str) -> Vec<SearchItem> {
        if query.is_empty() {
            let mut items = items;
            reindex(&mut items);
            return items;
        }

        let pattern = Pattern::new(
            query,
            CaseMatching::Smart,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        let mut scored: Vec<(SearchItem, f64)> = items
            .into_iter()
            .filter_map(|item| {
                let score = self.score_item(&pattern, &item)?;
                Some((item, score))
            })
            .collect();

        debug!("Search found {} matches before sort/filter", scored.len());

        // Stable sort: ties keep their original relative order
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        scored.retain(|(_, score)| *score >= self.config.threshold);

        let mut results: Vec<SearchItem> = scored.into_iter().map(|(item, _)| item).collect();
        reindex(&mut results);
        results
    }

    /// Score a single item across its match fields. `None` means no
    /// field matched at all.
    fn score_item(&mut self, pattern: &Pattern, item: &SearchItem) -> Option<f64> {
        let mut title_buf = Vec::new();
        let title_score = pattern.score(
            Utf32Str::new(&item.title, &mut title_buf),
            &mut self.matcher,
        );

        let mut url_buf = Vec::new();
        let url_score = pattern.score(Utf32Str::new(&item.url, &mut url_buf), &mut self.matcher);

        let key_score = item.display_key.and_then(|key| {
            let key_text = key.to_string();
            let mut key_buf = Vec::new();
            pattern.score(Utf32Str::new(&key_text, &mut key_buf), &mut self.matcher)
        });

        if title_score.is_none() && url_score.is_none() && key_score.is_none() {
            return None;
        }

        let combined = f64::from(title_score.unwrap_or(0)) * self.config.title_weight
            + f64::from(url_score.unwrap_or(0)) * self.config.url_weight
            + f64::from(key_score.unwrap_or(0)) * self.config.key_weight;

        Some(combined)
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Reassign `idx` to the current array position.
fn reindex(items: &mut [SearchItem]) {
    for (position, item) in items.iter_mut().enumerate() {
        item.idx = position;
    }
}
