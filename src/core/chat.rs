use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::api::CreateThreadRequest;
use crate::core::backend::{ensure_success, Backend};
use crate::core::errors::StoreError;
use crate::core::shared_selection::{ManagedItem, SelectionState};

/// A conversation thread bound to the assistant that answers in it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Chat {
    pub thread_id: String,
    pub assistant_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ManagedItem for Chat {
    fn id(&self) -> &str {
        &self.thread_id
    }
}

#[async_trait]
/// Owner of the chat list and the current-chat pointer.
pub trait ChatStore: Send {
    /// `None` until the list has been loaded.
    fn list(&self) -> Option<&[Chat]>;

    fn current(&self) -> Option<&Chat>;

    /// Create a chat titled by its first message. The created chat becomes
    /// current before this returns.
    async fn create(&mut self, message: &str, assistant_id: &str) -> Result<Chat, StoreError>;

    fn select(&mut self, thread_id: Option<&str>);
}

pub struct RemoteChatStore {
    backend: Backend,
    state: SelectionState<Chat>,
}

impl RemoteChatStore {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: SelectionState::new("Thread"),
        }
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        let response = self.backend.request(Method::GET, "threads/").send().await?;
        let response = ensure_success(response)
            .await
            .map_err(|(status, body)| StoreError::Status { status, body })?;
        let chats: Vec<Chat> = response.json().await?;
        debug!(count = chats.len(), "loaded threads");
        self.state.replace_items(chats);
        Ok(())
    }

    pub fn find(&self, thread_id: &str) -> Option<&Chat> {
        self.state.find_by_id(thread_id)
    }

    pub fn describe_missing(&self, thread_id: &str) -> String {
        self.state.describe_missing(thread_id)
    }
}

#[async_trait]
impl ChatStore for RemoteChatStore {
    fn list(&self) -> Option<&[Chat]> {
        self.state.items()
    }

    fn current(&self) -> Option<&Chat> {
        self.state.get_active()
    }

    async fn create(&mut self, message: &str, assistant_id: &str) -> Result<Chat, StoreError> {
        let body = CreateThreadRequest {
            name: message,
            assistant_id,
        };
        let response = self
            .backend
            .request(Method::POST, "threads")
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response)
            .await
            .map_err(|(status, body)| StoreError::Status { status, body })?;
        let chat: Chat = response.json().await?;
        debug!(thread_id = %chat.thread_id, assistant_id, "created thread");

        self.state.upsert(chat.clone());
        self.state.set_active(Some(&chat.thread_id));
        Ok(chat)
    }

    fn select(&mut self, thread_id: Option<&str>) {
        self.state.set_active(thread_id);
    }
}
