//! Tests for the per-source query pipeline: fetch order, ranking,
//! filtering, and provider degradation.

use super::fixtures::*;
use crate::provider::NativeTab;
use hopper_types::SourceType;

#[tokio::test]
async fn test_empty_query_preserves_provider_order() {
    let harness = make_harness(five_tabs(), Vec::new(), Vec::new());

    let items = harness
        .pipeline
        .search(SourceType::Tabs, "")
        .await
        .unwrap();

    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["GitHub PR", "Gmail", "YouTube", "Docs", "Stack Overflow"]
    );
    for (position, item) in items.iter().enumerate() {
        assert_eq!(item.idx, position, "idx equals array position");
    }
}

#[tokio::test]
async fn test_tabs_get_source_id_and_display_key() {
    let harness = make_harness(five_tabs(), Vec::new(), Vec::new());

    let items = harness
        .pipeline
        .search(SourceType::Tabs, "")
        .await
        .unwrap();

    assert_eq!(items[0].source_id, Some(1));
    assert_eq!(items[0].display_key, Some(1));
    assert_eq!(items[4].display_key, Some(5));
}

#[tokio::test]
async fn test_git_query_returns_exactly_github_pr() {
    let harness = make_harness(five_tabs(), Vec::new(), Vec::new());

    let items = harness
        .pipeline
        .search(SourceType::Tabs, "git")
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "GitHub PR");
    assert_eq!(items[0].idx, 0);
}

#[tokio::test]
async fn test_results_are_subset_in_relevance_order() {
    let harness = make_harness(five_tabs(), Vec::new(), Vec::new());

    let all = harness
        .pipeline
        .search(SourceType::Tabs, "")
        .await
        .unwrap();
    let matched = harness
        .pipeline
        .search(SourceType::Tabs, "o")
        .await
        .unwrap();

    assert!(!matched.is_empty());
    assert!(matched.len() <= all.len());
    let all_urls: Vec<_> = all.iter().map(|i| i.url.clone()).collect();
    for item in &matched {
        assert!(all_urls.contains(&item.url));
    }
}

#[tokio::test]
async fn test_internal_pages_are_excluded_from_tab_candidates() {
    let mut tabs = five_tabs();
    tabs.push(NativeTab {
        id: Some(99),
        title: Some("Firefox View".to_string()),
        url: Some("about:firefoxview".to_string()),
        fav_icon_url: None,
        active: false,
    });
    let harness = make_harness(tabs, Vec::new(), Vec::new());

    let items = harness
        .pipeline
        .search(SourceType::Tabs, "")
        .await
        .unwrap();

    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|i| i.url != "about:firefoxview"));
}

#[tokio::test]
async fn test_bookmarks_flattened_in_tree_order() {
    let roots = vec![make_folder(
        "toolbar",
        vec![
            make_bookmark("Rust Book", "https://doc.rust-lang.org/book/"),
            make_folder(
                "work",
                vec![make_bookmark("Tracker", "https://tracker.example.com")],
            ),
            make_bookmark("Recipes", "https://recipes.example.com"),
        ],
    )];
    let harness = make_harness(Vec::new(), roots, Vec::new());

    let items = harness
        .pipeline
        .search(SourceType::Bookmarks, "")
        .await
        .unwrap();

    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Rust Book", "Tracker", "Recipes"]);
    assert!(items.iter().all(|i| !i.is_tab()));
}

#[tokio::test]
async fn test_history_fetch_uses_unrestricted_window() {
    let entries = vec![
        make_history("Old page", "https://old.example.com"),
        make_history("New page", "https://new.example.com"),
    ];
    let harness = make_harness(Vec::new(), Vec::new(), entries);

    let items = harness
        .pipeline
        .search(SourceType::History, "")
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    let (text, max_results, start_time) = harness.history.last_args().unwrap();
    assert_eq!(text, "");
    assert_eq!(max_results, 10_000);
    assert_eq!(start_time, 0);
}

#[tokio::test]
async fn test_provider_failure_propagates() {
    let harness = make_harness(five_tabs(), Vec::new(), Vec::new());
    harness.tabs.set_fail_queries(true);

    let result = harness.pipeline.search(SourceType::Tabs, "").await;
    assert!(result.is_err(), "provider failure is the caller's to absorb");
}

#[tokio::test]
async fn test_categorization_disabled_leaves_items_unlabeled() {
    let harness = make_harness(five_tabs(), Vec::new(), Vec::new());

    let items = harness
        .pipeline
        .search(SourceType::Tabs, "")
        .await
        .unwrap();

    assert!(items.iter().all(|i| i.category.is_none()));
    assert_eq!(harness.classifier.calls(), 0);
}
