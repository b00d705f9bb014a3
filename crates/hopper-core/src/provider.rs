//! Abstract browser data providers.
//!
//! Tabs, bookmarks, and history are three independent search domains;
//! the embedding shell implements these traits over the host browser
//! APIs. Records are serializable so scripted providers in tests can be
//! built from JSON.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Native tab identifier assigned by the browser.
pub type TabId = i64;

/// A tab as reported by the host browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTab {
    #[serde(default)]
    pub id: Option<TabId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// A node of the host bookmark tree. Only nodes carrying a URL are
/// search candidates; the rest are folders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkNode {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<BookmarkNode>,
}

/// A visited page from the host history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Live tabs of the current browser window.
///
/// # Errors
///
/// Every method reports host API failures as
/// [`crate::Error::Provider`]; provider errors are the one class that
/// may degrade the visible result list.
#[async_trait]
pub trait TabProvider: Send + Sync {
    async fn query_current_window(&self) -> Result<Vec<NativeTab>>;

    /// Focus an open tab by native id.
    async fn activate(&self, id: TabId) -> Result<()>;

    /// Navigate a tab to `url`; `None` targets the active tab.
    async fn navigate(&self, id: Option<TabId>, url: &str) -> Result<()>;

    /// Open `url` in a new tab.
    async fn create(&self, url: &str) -> Result<()>;

    /// Close a tab by native id.
    async fn remove(&self, id: TabId) -> Result<()>;
}

/// Bookmark collaborator.
///
/// # Errors
///
/// Host API failures surface as [`crate::Error::Provider`].
#[async_trait]
pub trait BookmarkProvider: Send + Sync {
    /// The full bookmark tree, roots first.
    async fn tree(&self) -> Result<Vec<BookmarkNode>>;
}

/// History collaborator.
///
/// # Errors
///
/// Host API failures surface as [`crate::Error::Provider`].
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Search visited pages. An empty `text` matches everything.
    async fn search(
        &self,
        text: &str,
        max_results: usize,
        start_time_ms: u64,
    ) -> Result<Vec<HistoryEntry>>;
}

/// Synthetic browser pages that never belong in the candidate list.
#[must_use]
pub fn is_internal_page(tab: &NativeTab) -> bool {
    let title = tab.title.as_deref().unwrap_or("");
    let url = tab.url.as_deref().unwrap_or("");
    title == "Firefox View" || url == "about:firefoxview" || url == "about:newtab"
}

/// Flatten a bookmark tree into its leaf records, preserving the
/// tree's natural order. Iterative so deep trees cannot overflow the
/// call stack.
#[must_use]
pub fn flatten_bookmark_tree(roots: &[BookmarkNode]) -> Vec<BookmarkNode> {
    let mut flat = Vec::new();
    let mut stack: Vec<&BookmarkNode> = roots.iter().rev().collect();

    while let Some(node) = stack.pop() {
        if node.url.is_some() {
            flat.push(node.clone());
        }
        for child in node.children.iter().rev() {
            stack.push(child);
        }
    }

    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(title: &str, url: &str) -> BookmarkNode {
        BookmarkNode {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            children: Vec::new(),
        }
    }

    fn folder(title: &str, children: Vec<BookmarkNode>) -> BookmarkNode {
        BookmarkNode {
            title: Some(title.to_string()),
            url: None,
            children,
        }
    }

    #[test]
    fn test_flatten_preserves_natural_order() {
        let roots = vec![folder(
            "toolbar",
            vec![
                leaf("first", "https://a.example"),
                folder(
                    "nested",
                    vec![
                        leaf("second", "https://b.example"),
                        leaf("third", "https://c.example"),
                    ],
                ),
                leaf("fourth", "https://d.example"),
            ],
        )];

        let flat = flatten_bookmark_tree(&roots);
        let titles: Vec<_> = flat
            .iter()
            .map(|b| b.title.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(titles, vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn test_flatten_skips_folders() {
        let roots = vec![folder("empty", vec![]), leaf("only", "https://x.example")];
        let flat = flatten_bookmark_tree(&roots);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].url.as_deref(), Some("https://x.example"));
    }

    #[test]
    fn test_flatten_handles_deep_nesting() {
        // A pathological 10k-deep chain must not overflow the stack
        let mut node = leaf("bottom", "https://deep.example");
        for i in 0..10_000 {
            node = folder(&format!("level{i}"), vec![node]);
        }

        let flat = flatten_bookmark_tree(std::slice::from_ref(&node));
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].title.as_deref(), Some("bottom"));
    }

    #[test]
    fn test_internal_page_detection() {
        let firefox_view = NativeTab {
            title: Some("Firefox View".to_string()),
            url: Some("about:firefoxview".to_string()),
            ..Default::default()
        };
        assert!(is_internal_page(&firefox_view));

        let new_tab = NativeTab {
            url: Some("about:newtab".to_string()),
            ..Default::default()
        };
        assert!(is_internal_page(&new_tab));

        let regular = NativeTab {
            title: Some("GitHub".to_string()),
            url: Some("https://github.com".to_string()),
            ..Default::default()
        };
        assert!(!is_internal_page(&regular));
    }

    #[test]
    fn test_native_tab_from_sparse_json() {
        let tab: NativeTab = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(tab.id, Some(3));
        assert!(tab.title.is_none());
        assert!(!tab.active);
    }
}
