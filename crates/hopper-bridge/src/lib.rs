//! Background coordinator for the Hopper palette.
//!
//! The palette UI never touches browser tabs directly: it posts a
//! typed [`PaletteMessage`] and this coordinator performs the actual
//! navigation through the tab provider. Failures are logged and
//! surfaced to the embedding shell; they never crash the palette.

use hopper_core::Result;
use hopper_core::provider::TabProvider;
use hopper_types::PaletteMessage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Coordinator {
    tabs: Arc<dyn TabProvider>,
}

impl Coordinator {
    #[must_use]
    pub fn new(tabs: Arc<dyn TabProvider>) -> Self {
        Self { tabs }
    }

    /// Perform the navigation a palette message asks for.
    ///
    /// # Errors
    ///
    /// Returns an error when the tab provider fails.
    pub async fn handle(&self, message: PaletteMessage) -> Result<()> {
        debug!("Handling palette message: {message:?}");
        match message {
            PaletteMessage::SwitchTab { element, new_tab } => {
                if new_tab {
                    return self.tabs.create(&element.url).await;
                }
                match element.source_id {
                    Some(id) => self.tabs.activate(id).await,
                    // The native tab is gone; fall back to its URL
                    None => self.tabs.create(&element.url).await,
                }
            }
            PaletteMessage::OpenTarget { element, new_tab } => {
                if new_tab {
                    self.tabs.create(&element.url).await
                } else {
                    self.tabs.navigate(None, &element.url).await
                }
            }
            PaletteMessage::DuplicateTab => self.duplicate_active_tab().await,
        }
    }

    async fn duplicate_active_tab(&self) -> Result<()> {
        let tabs = self.tabs.query_current_window().await?;
        let Some(active) = tabs.into_iter().find(|tab| tab.active) else {
            warn!("No active tab to duplicate");
            return Ok(());
        };
        self.tabs
            .create(active.url.as_deref().unwrap_or_default())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hopper_core::Error;
    use hopper_core::provider::{NativeTab, TabId};
    use hopper_types::SearchItem;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Action {
        Activated(TabId),
        Navigated(Option<TabId>, String),
        Created(String),
    }

    #[derive(Default)]
    struct RecordingTabs {
        tabs: Vec<NativeTab>,
        actions: Mutex<Vec<Action>>,
        fail: bool,
    }

    impl RecordingTabs {
        fn actions(&self) -> Vec<Action> {
            self.actions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TabProvider for RecordingTabs {
        async fn query_current_window(&self) -> Result<Vec<NativeTab>> {
            if self.fail {
                return Err(Error::Provider("scripted failure".to_string()));
            }
            Ok(self.tabs.clone())
        }

        async fn activate(&self, id: TabId) -> Result<()> {
            self.actions.lock().unwrap().push(Action::Activated(id));
            Ok(())
        }

        async fn navigate(&self, id: Option<TabId>, url: &str) -> Result<()> {
            self.actions
                .lock()
                .unwrap()
                .push(Action::Navigated(id, url.to_string()));
            Ok(())
        }

        async fn create(&self, url: &str) -> Result<()> {
            self.actions
                .lock()
                .unwrap()
                .push(Action::Created(url.to_string()));
            Ok(())
        }

        async fn remove(&self, _id: TabId) -> Result<()> {
            Ok(())
        }
    }

    fn tab_item(id: Option<TabId>, url: &str) -> SearchItem {
        SearchItem {
            title: "Example".to_string(),
            url: url.to_string(),
            idx: 0,
            source_id: id,
            display_key: id.map(|_| 1),
            icon_url: None,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_switch_tab_activates_by_native_id() {
        let tabs = Arc::new(RecordingTabs::default());
        let coordinator = Coordinator::new(tabs.clone());

        coordinator
            .handle(PaletteMessage::SwitchTab {
                element: tab_item(Some(7), "https://github.com"),
                new_tab: false,
            })
            .await
            .unwrap();

        assert_eq!(tabs.actions(), vec![Action::Activated(7)]);
    }

    #[tokio::test]
    async fn test_switch_tab_with_modifier_opens_new_tab() {
        let tabs = Arc::new(RecordingTabs::default());
        let coordinator = Coordinator::new(tabs.clone());

        coordinator
            .handle(PaletteMessage::SwitchTab {
                element: tab_item(Some(7), "https://github.com"),
                new_tab: true,
            })
            .await
            .unwrap();

        assert_eq!(
            tabs.actions(),
            vec![Action::Created("https://github.com".to_string())]
        );
    }

    #[tokio::test]
    async fn test_open_target_navigates_current_tab() {
        let tabs = Arc::new(RecordingTabs::default());
        let coordinator = Coordinator::new(tabs.clone());

        coordinator
            .handle(PaletteMessage::OpenTarget {
                element: tab_item(None, "https://docs.example.com"),
                new_tab: false,
            })
            .await
            .unwrap();

        assert_eq!(
            tabs.actions(),
            vec![Action::Navigated(
                None,
                "https://docs.example.com".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_open_target_with_modifier_creates_tab() {
        let tabs = Arc::new(RecordingTabs::default());
        let coordinator = Coordinator::new(tabs.clone());

        coordinator
            .handle(PaletteMessage::OpenTarget {
                element: tab_item(None, "https://docs.example.com"),
                new_tab: true,
            })
            .await
            .unwrap();

        assert_eq!(
            tabs.actions(),
            vec![Action::Created("https://docs.example.com".to_string())]
        );
    }

    #[tokio::test]
    async fn test_duplicate_recreates_the_active_tab() {
        let tabs = Arc::new(RecordingTabs {
            tabs: vec![
                NativeTab {
                    id: Some(1),
                    url: Some("https://background.example".to_string()),
                    ..Default::default()
                },
                NativeTab {
                    id: Some(2),
                    url: Some("https://active.example".to_string()),
                    active: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let coordinator = Coordinator::new(tabs.clone());

        coordinator.handle(PaletteMessage::DuplicateTab).await.unwrap();

        assert_eq!(
            tabs.actions(),
            vec![Action::Created("https://active.example".to_string())]
        );
    }

    #[tokio::test]
    async fn test_duplicate_without_active_tab_is_a_no_op() {
        let tabs = Arc::new(RecordingTabs::default());
        let coordinator = Coordinator::new(tabs.clone());

        coordinator.handle(PaletteMessage::DuplicateTab).await.unwrap();
        assert!(tabs.actions().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_to_the_shell() {
        let tabs = Arc::new(RecordingTabs {
            fail: true,
            ..Default::default()
        });
        let coordinator = Coordinator::new(tabs);

        let result = coordinator.handle(PaletteMessage::DuplicateTab).await;
        assert!(result.is_err());
    }
}
