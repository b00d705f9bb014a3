use crate::error::{Error, Result};
use async_trait::async_trait;
use hopper_types::{CategoryAssignment, ClassificationResponse, RequestItem};
use std::time::Duration;
use tracing::debug;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const SYSTEM_PROMPT: &str = "You are a browser tab categorization assistant. Categorize each tab into one of these categories based on its title and URL:
- research: Educational content, documentation, articles, Wikipedia, learning resources
- development: Code repositories, developer tools, IDEs, technical documentation
- entertainment: Videos, music, games, streaming services
- shopping: E-commerce sites, product pages, online stores
- social: Social media platforms, messaging apps
- productivity: Task managers, calendars, note-taking apps, office tools
- news: News websites, current events
- communication: Email, chat applications, video conferencing
- other: Anything that doesn't fit the above categories

Return ONLY a valid JSON object with this exact structure:
{
  \"categories\": [
    {\"idx\": 0, \"category\": \"research\"},
    {\"idx\": 1, \"category\": \"development\"}
  ]
}";

/// Seam for the remote classification endpoint.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one ordered batch. Returned indices reference batch
    /// positions; the caller resolves them.
    async fn classify(
        &self,
        api_key: &str,
        items: &[RequestItem],
    ) -> Result<Vec<CategoryAssignment>>;
}

/// HTTP client for the remote text-classification endpoint.
///
/// One batched request per call, no retry; retry policy, if any,
/// belongs to the caller.
pub struct ClassifierClient {
    http: reqwest::Client,
    api_url: String,
}

impl ClassifierClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_URL)
    }

    /// Point the client at a custom endpoint (proxies, tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_base_url(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_url: url.into(),
        })
    }

    /// Provider key shape check. An invalid key is rejected locally,
    /// before any network call.
    #[must_use]
    pub fn is_valid_key(key: &str) -> bool {
        key.starts_with("sk-") && key.len() > 20
    }

    fn build_request_body(items: &[RequestItem]) -> Result<serde_json::Value> {
        let user_prompt = format!(
            "Categorize these tabs:\n{}",
            serde_json::to_string_pretty(items)?
        );

        Ok(serde_json::json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": 0.3,
            "response_format": { "type": "json_object" },
        }))
    }

    /// Pull the message content out of a chat-completions payload.
    fn extract_content(payload: &serde_json::Value) -> Option<&str> {
        payload
            .get("choices")?
            .as_array()?
            .first()?
            .get("message")?
            .get("content")?
            .as_str()
    }
}

#[async_trait]
impl Classifier for ClassifierClient {
    async fn classify(
        &self,
        api_key: &str,
        items: &[RequestItem],
    ) -> Result<Vec<CategoryAssignment>> {
        if !Self::is_valid_key(api_key) {
            return Err(Error::InvalidApiKey);
        }

        let body = Self::build_request_body(items)?;

        debug!(batch = items.len(), "Sending classification request");

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ClassifierTransport {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let payload: serde_json::Value = serde_json::from_str(&text)?;

        let Some(content) = Self::extract_content(&payload) else {
            return Err(Error::ClassifierEmptyResponse);
        };

        let parsed: ClassificationResponse = serde_json::from_str(content)?;

        debug!(
            labels = parsed.categories.len(),
            "Classification response parsed"
        );
        Ok(parsed.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopper_types::Category;

    #[test]
    fn test_key_validation() {
        assert!(ClassifierClient::is_valid_key(
            "sk-0123456789012345678901234567890123456789"
        ));
        assert!(!ClassifierClient::is_valid_key(""));
        assert!(!ClassifierClient::is_valid_key("sk-short"));
        assert!(!ClassifierClient::is_valid_key(
            "pk-0123456789012345678901234567890123456789"
        ));
    }

    #[test]
    fn test_system_prompt_covers_full_taxonomy() {
        for category in Category::GROUP_ORDER {
            assert!(
                SYSTEM_PROMPT.contains(category.as_str()),
                "taxonomy must name {category}"
            );
        }
    }

    #[test]
    fn test_request_body_shape() {
        let items = vec![RequestItem {
            idx: 0,
            title: "GitHub PR".to_string(),
            url: "https://github.com/pulls".to_string(),
        }];

        let body = ClassifierClient::build_request_body(&items).unwrap();
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["temperature"], 0.3);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("github.com/pulls"));
    }

    #[test]
    fn test_extract_content_from_documented_shape() {
        let payload = serde_json::json!({
            "choices": [
                { "message": { "content": "{\"categories\":[]}" } }
            ]
        });
        assert_eq!(
            ClassifierClient::extract_content(&payload),
            Some("{\"categories\":[]}")
        );
    }

    #[test]
    fn test_extract_content_missing_payload() {
        let payload = serde_json::json!({ "choices": [] });
        assert!(ClassifierClient::extract_content(&payload).is_none());

        let payload = serde_json::json!({});
        assert!(ClassifierClient::extract_content(&payload).is_none());
    }
}
