//! Conversion of provider-native records into the uniform
//! [`SearchItem`] shape.
//!
//! Pure mappings with no failure modes: malformed input degrades to
//! empty-string fields. Only tabs populate `source_id` and the 1-based
//! `display_key`.

use crate::provider::{BookmarkNode, HistoryEntry, NativeTab};
use hopper_types::SearchItem;

#[must_use]
pub fn from_tab(tab: &NativeTab, idx: usize) -> SearchItem {
    SearchItem {
        title: tab.title.clone().unwrap_or_default(),
        url: tab.url.clone().unwrap_or_default(),
        idx,
        source_id: Some(tab.id.unwrap_or(0)),
        display_key: Some(idx + 1),
        icon_url: Some(tab.fav_icon_url.clone().unwrap_or_default()),
        category: None,
    }
}

#[must_use]
pub fn from_bookmark(bookmark: &BookmarkNode, idx: usize) -> SearchItem {
    SearchItem {
        title: bookmark.title.clone().unwrap_or_default(),
        url: bookmark.url.clone().unwrap_or_default(),
        idx,
        source_id: None,
        display_key: None,
        icon_url: None,
        category: None,
    }
}

#[must_use]
pub fn from_history(entry: &HistoryEntry, idx: usize) -> SearchItem {
    SearchItem {
        title: entry.title.clone().unwrap_or_default(),
        url: entry.url.clone().unwrap_or_default(),
        idx,
        source_id: None,
        display_key: None,
        icon_url: None,
        category: None,
    }
}
