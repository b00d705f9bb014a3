//! Per-source query pipeline: fetch → normalize → rank → label.
//!
//! Categorization always runs last so cached and classified labels key
//! off exactly the URLs the user will see.

use crate::Result;
use crate::classify::Categorizer;
use crate::normalize;
use crate::provider::{
    BookmarkProvider, HistoryProvider, TabId, TabProvider, flatten_bookmark_tree, is_internal_page,
};
use crate::search::SearchEngine;
use hopper_types::{SearchItem, SourceType};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// History fetch window: everything since time zero, capped.
const HISTORY_MAX_RESULTS: usize = 10_000;

pub struct QueryPipeline {
    tabs: Arc<dyn TabProvider>,
    bookmarks: Arc<dyn BookmarkProvider>,
    history: Arc<dyn HistoryProvider>,
    engine: Mutex<SearchEngine>,
    categorizer: Categorizer,
}

impl QueryPipeline {
    #[must_use]
    pub fn new(
        tabs: Arc<dyn TabProvider>,
        bookmarks: Arc<dyn BookmarkProvider>,
        history: Arc<dyn HistoryProvider>,
        categorizer: Categorizer,
    ) -> Self {
        Self {
            tabs,
            bookmarks,
            history,
            engine: Mutex::new(SearchEngine::new()),
            categorizer,
        }
    }

    /// Run one search against `source`.
    ///
    /// # Errors
    ///
    /// Returns an error when the data provider fails; ranking and
    /// categorization cannot fail the search.
    pub async fn search(&self, source: SourceType, query: &str) -> Result<Vec<SearchItem>> {
        let items = match source {
            SourceType::Tabs => self.fetch_tabs().await?,
            SourceType::Bookmarks => self.fetch_bookmarks().await?,
            SourceType::History => self.fetch_history().await?,
        };

        debug!("Fetched {} candidates from {source}", items.len());

        let ranked = {
            // The matcher needs exclusive access; hold the lock only
            // while ranking
            let mut engine = self
                .engine
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            engine.rank(items, query)
        };

        Ok(self.categorizer.categorize(ranked, source).await)
    }

    /// Close a live tab by native id.
    ///
    /// # Errors
    ///
    /// Returns an error when the tab provider fails.
    pub async fn remove_tab(&self, id: TabId) -> Result<()> {
        self.tabs.remove(id).await
    }

    async fn fetch_tabs(&self) -> Result<Vec<SearchItem>> {
        let tabs = self.tabs.query_current_window().await?;
        Ok(tabs
            .iter()
            .filter(|tab| !is_internal_page(tab))
            .enumerate()
            .map(|(idx, tab)| normalize::from_tab(tab, idx))
            .collect())
    }

    async fn fetch_bookmarks(&self) -> Result<Vec<SearchItem>> {
        let roots = self.bookmarks.tree().await?;
        Ok(flatten_bookmark_tree(&roots)
            .iter()
            .enumerate()
            .map(|(idx, bookmark)| normalize::from_bookmark(bookmark, idx))
            .collect())
    }

    async fn fetch_history(&self) -> Result<Vec<SearchItem>> {
        let entries = self.history.search("", HISTORY_MAX_RESULTS, 0).await?;
        Ok(entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| normalize::from_history(entry, idx))
            .collect())
    }
}
