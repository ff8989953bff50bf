use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::api::PutAssistantRequest;
use crate::core::backend::{ensure_success, Backend};
use crate::core::errors::StoreError;
use crate::core::shared_selection::{ManagedItem, SelectionState};

/// A named, reusable assistant configuration. `config` is opaque here and is
/// interpreted only by the backend that runs turns.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AssistantConfig {
    #[serde(default)]
    pub assistant_id: String,
    pub name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl AssistantConfig {
    /// A config that has never been saved; the backend assigns its id.
    pub fn draft(name: impl Into<String>, config: Value) -> Self {
        Self {
            assistant_id: String::new(),
            name: name.into(),
            config,
            public: false,
            updated_at: None,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.assistant_id.is_empty()
    }
}

impl ManagedItem for AssistantConfig {
    fn id(&self) -> &str {
        &self.assistant_id
    }
}

#[async_trait]
/// Owner of the assistant list and the current-assistant pointer.
pub trait ConfigStore: Send {
    /// `None` until the list has been loaded.
    fn list(&self) -> Option<&[AssistantConfig]>;

    fn current(&self) -> Option<&AssistantConfig>;

    fn select(&mut self, assistant_id: Option<&str>);

    /// Persist `config` and make the saved version current.
    async fn save(&mut self, config: AssistantConfig) -> Result<AssistantConfig, StoreError>;
}

pub struct RemoteConfigStore {
    backend: Backend,
    state: SelectionState<AssistantConfig>,
}

impl RemoteConfigStore {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: SelectionState::new("Assistant"),
        }
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        let response = self
            .backend
            .request(Method::GET, "assistants/")
            .send()
            .await?;
        let response = ensure_success(response)
            .await
            .map_err(|(status, body)| StoreError::Status { status, body })?;
        let configs: Vec<AssistantConfig> = response.json().await?;
        debug!(count = configs.len(), "loaded assistants");
        self.state.replace_items(configs);
        Ok(())
    }

    pub fn find(&self, assistant_id: &str) -> Option<&AssistantConfig> {
        self.state.find_by_id(assistant_id)
    }

    pub fn describe_missing(&self, assistant_id: &str) -> String {
        self.state.describe_missing(assistant_id)
    }
}

#[async_trait]
impl ConfigStore for RemoteConfigStore {
    fn list(&self) -> Option<&[AssistantConfig]> {
        self.state.items()
    }

    fn current(&self) -> Option<&AssistantConfig> {
        self.state.get_active()
    }

    fn select(&mut self, assistant_id: Option<&str>) {
        self.state.set_active(assistant_id);
    }

    async fn save(&mut self, config: AssistantConfig) -> Result<AssistantConfig, StoreError> {
        let body = PutAssistantRequest {
            name: &config.name,
            config: &config.config,
            public: config.public,
        };
        let request = if config.is_draft() {
            self.backend.request(Method::POST, "assistants")
        } else {
            let endpoint = format!("assistants/{}", config.assistant_id);
            self.backend.request(Method::PUT, &endpoint)
        };
        let response = request.json(&body).send().await?;
        let response = ensure_success(response)
            .await
            .map_err(|(status, body)| StoreError::Status { status, body })?;
        let saved: AssistantConfig = response.json().await?;
        debug!(assistant_id = %saved.assistant_id, "saved assistant");

        self.state.upsert(saved.clone());
        self.state.set_active(Some(&saved.assistant_id));
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{spawn_http_responder, test_backend, CannedResponse};
    use serde_json::json;

    #[tokio::test]
    async fn refresh_keeps_backend_order() {
        let (base_url, captured) = spawn_http_responder(vec![CannedResponse::json(
            200,
            r#"[{"assistant_id":"a2","name":"Second","config":{},"public":true},
                {"assistant_id":"a1","name":"First","config":{}}]"#,
        )])
        .await;
        let mut store = RemoteConfigStore::new(test_backend(&base_url));

        store.refresh().await.expect("refresh should succeed");

        let ids: Vec<&str> = store
            .list()
            .expect("list loaded")
            .iter()
            .map(|config| config.assistant_id.as_str())
            .collect();
        assert_eq!(ids, ["a2", "a1"]);
        assert!(store.find("a2").is_some_and(|config| config.public));
        assert!(captured.lock().await[0]
            .request_line
            .starts_with("GET /assistants/ "));
    }

    #[tokio::test]
    async fn save_puts_existing_assistant_and_selects_it() {
        let (base_url, captured) = spawn_http_responder(vec![CannedResponse::json(
            200,
            r#"{"assistant_id":"a1","name":"Renamed","config":{"configurable":{}},"public":false}"#,
        )])
        .await;
        let mut store = RemoteConfigStore::new(test_backend(&base_url));
        let mut config = AssistantConfig::draft("Renamed", json!({ "configurable": {} }));
        config.assistant_id = "a1".into();

        let saved = store.save(config).await.expect("save should succeed");

        assert_eq!(saved.name, "Renamed");
        assert_eq!(store.current().map(|c| c.assistant_id.as_str()), Some("a1"));

        let requests = captured.lock().await;
        assert!(requests[0].request_line.starts_with("PUT /assistants/a1 "));
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["name"], "Renamed");
        assert_eq!(body["public"], false);
    }

    #[tokio::test]
    async fn save_posts_drafts() {
        let (base_url, captured) = spawn_http_responder(vec![CannedResponse::json(
            200,
            r#"{"assistant_id":"new-1","name":"Draft","config":{}}"#,
        )])
        .await;
        let mut store = RemoteConfigStore::new(test_backend(&base_url));

        let saved = store
            .save(AssistantConfig::draft("Draft", json!({})))
            .await
            .expect("save should succeed");

        assert_eq!(saved.assistant_id, "new-1");
        assert_eq!(store.list().map(<[_]>::len), Some(1));
        assert!(captured.lock().await[0]
            .request_line
            .starts_with("POST /assistants "));
    }

    #[tokio::test]
    async fn malformed_list_is_a_decode_error() {
        let (base_url, _captured) =
            spawn_http_responder(vec![CannedResponse::json(200, r#"{"not":"a list"}"#)]).await;
        let mut store = RemoteConfigStore::new(test_backend(&base_url));

        let err = store.refresh().await.expect_err("refresh should fail");

        assert!(matches!(err, StoreError::Decode(_)));
        assert!(store.list().is_none());
    }
}
