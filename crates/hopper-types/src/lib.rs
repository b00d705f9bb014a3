//! Shared types for Hopper palette components.
//!
//! This crate provides the core types used across hopper-core and
//! hopper-bridge. All types are serializable so they can cross the
//! boundary to the host key-value store and the palette messaging
//! channel unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Deserialize a Vec that may be null or missing (both become empty vec)
fn deserialize_null_as_empty_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// A search domain: each source is queried, ranked, and cached
/// independently of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Tabs,
    Bookmarks,
    History,
}

impl SourceType {
    pub const ALL: [Self; 3] = [Self::Tabs, Self::Bookmarks, Self::History];

    /// Storage key for this source's category cache blob.
    #[must_use]
    pub fn cache_key(self) -> &'static str {
        match self {
            Self::Tabs => "categories_cache_tabs",
            Self::Bookmarks => "categories_cache_bookmarks",
            Self::History => "categories_cache_history",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tabs => "tabs",
            Self::Bookmarks => "bookmarks",
            Self::History => "history",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic label assigned to a result item by the classifier.
///
/// The wire format is the lowercase name; the remote endpoint is
/// instructed to pick from exactly this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Research,
    Development,
    Entertainment,
    Shopping,
    Social,
    Productivity,
    News,
    Communication,
    Other,
}

impl Category {
    /// Fixed ordering used when grouping results by category.
    pub const GROUP_ORDER: [Self; 9] = [
        Self::Development,
        Self::Research,
        Self::Productivity,
        Self::Communication,
        Self::Social,
        Self::News,
        Self::Shopping,
        Self::Entertainment,
        Self::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Development => "development",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Social => "social",
            Self::Productivity => "productivity",
            Self::News => "news",
            Self::Communication => "communication",
            Self::Other => "other",
        }
    }

    /// Human-readable label for the grouped results panel.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Development => "Development",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Social => "Social",
            Self::Productivity => "Productivity",
            Self::News => "News",
            Self::Communication => "Communication",
            Self::Other => "Other",
        }
    }

    /// Emoji badge shown next to the label.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Research => "\u{1f4da}",
            Self::Development => "\u{1f4bb}",
            Self::Entertainment => "\u{1f3ac}",
            Self::Shopping => "\u{1f6d2}",
            Self::Social => "\u{1f465}",
            Self::Productivity => "\u{2705}",
            Self::News => "\u{1f4f0}",
            Self::Communication => "\u{1f4ac}",
            Self::Other => "\u{1f4c4}",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform result record produced by the query pipeline.
///
/// Items are created fresh on every query execution; `idx` is the
/// position in the current ranked array and must never be stored as a
/// durable identifier. `url` is the stable identity key used for
/// categorization lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub title: String,
    pub url: String,

    /// Position in the current ranked result array (ephemeral).
    pub idx: usize,

    /// Native tab id; present only for live tabs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,

    /// 1-based ordinal shown to the user, tabs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_key: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    /// Topic label, absent until classification completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl SearchItem {
    /// Whether this item is a live tab (can be focused/closed by id).
    #[must_use]
    pub fn is_tab(&self) -> bool {
        self.source_id.is_some()
    }
}

/// One entry of a classification request batch.
///
/// `idx` is the position within the batch, not any cache or result
/// array; response indices resolve against this ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestItem {
    pub idx: usize,
    pub title: String,
    pub url: String,
}

/// Ordered batch sent to the classifier endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub items: Vec<RequestItem>,
}

/// One label in a classifier response, referencing a request position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAssignment {
    pub idx: usize,
    pub category: Category,
}

/// The constrained JSON object the classifier must return.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationResponse {
    #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
    pub categories: Vec<CategoryAssignment>,
}

/// Persisted category cache blob, one per source type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCacheEntry {
    /// Write time in epoch milliseconds; entries past the TTL are
    /// evicted on read.
    pub timestamp_ms: u64,
    pub categories: HashMap<String, Category>,
    pub source_type: SourceType,
}

/// Items grouped under one category, in grouping priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub items: Vec<SearchItem>,
}

/// Typed message posted by the palette UI to the background
/// coordinator, which performs the actual navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaletteMessage {
    /// Focus an open tab (or open its URL in a new tab).
    SwitchTab { element: SearchItem, new_tab: bool },

    /// Navigate to a bookmark/history URL in the current or a new tab.
    OpenTarget { element: SearchItem, new_tab: bool },

    /// Duplicate the active tab.
    DuplicateTab,
}

/// One entry of a store change-notification batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreChange {
    pub key: String,
    pub new_value: serde_json::Value,
}

/// Wheel-to-selection mapping preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    #[default]
    Default,
    Reversed,
}

/// Whether the palette popup keeps a fixed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupMode {
    Fixed,
    #[default]
    Unfixed,
}

/// Recognized keys in the host key-value store.
pub mod keys {
    pub const APPEARANCE: &str = "appearance";
    pub const POPUP_WINDOW: &str = "popup_window";
    pub const SCROLL: &str = "scroll";
    pub const OPENAI_KEY: &str = "openai_key";
    pub const ENABLE_CATEGORIZATION: &str = "enable_categorization";
}
