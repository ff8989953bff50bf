use tracing::{debug, info};

use super::ui_state::UiState;
use super::view::find_config;
use crate::api::TurnMessage;
use crate::core::assistant::{AssistantConfig, ConfigStore};
use crate::core::chat::{Chat, ChatStore};
use crate::core::chat_stream::StreamEngine;
use crate::core::errors::{StoreError, TurnError};

/// Why a turn request was dropped without touching any collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No chat was given and none is current.
    NoChat,
    /// No assistant is current, so there is nothing to create a chat for.
    NoConfig,
    /// The chat points at an assistant that is not (or no longer) loaded.
    UnknownAssistant { assistant_id: String },
    /// The assistant is loaded but carries no `config` payload to run with.
    EmptyConfig { assistant_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Started { thread_id: String, resumed: bool },
    Skipped(SkipReason),
}

impl TurnOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, TurnOutcome::Started { .. })
    }
}

/// Proof that the active stream slot has been released. Only the release
/// methods can construct one, and every acquire method consumes one.
#[must_use]
pub struct Released {
    _private: (),
}

/// Orchestrates selection changes and turn starts over borrowed stores.
///
/// Every method needs `&mut` access, so two operations can never interleave
/// on the same selection state.
pub struct TurnController<'a, C, K, S> {
    chats: &'a mut C,
    configs: &'a mut K,
    stream: &'a mut S,
    ui: &'a mut UiState,
}

impl<'a, C, K, S> TurnController<'a, C, K, S>
where
    C: ChatStore,
    K: ConfigStore,
    S: StreamEngine,
{
    pub fn new(chats: &'a mut C, configs: &'a mut K, stream: &'a mut S, ui: &'a mut UiState) -> Self {
        Self {
            chats,
            configs,
            stream,
            ui,
        }
    }

    /// Start or resume a turn in the current chat.
    pub async fn start_turn(&mut self, message: Option<&str>) -> Result<TurnOutcome, TurnError> {
        let chat = self.chats.current().cloned();
        self.start_turn_in(message, chat.as_ref()).await
    }

    /// Start or resume a turn in `chat`. An empty or missing message resumes
    /// the thread instead of sending new input.
    pub async fn start_turn_in(
        &mut self,
        message: Option<&str>,
        chat: Option<&Chat>,
    ) -> Result<TurnOutcome, TurnError> {
        let Some(chat) = chat else {
            debug!("turn skipped: no chat");
            return Ok(TurnOutcome::Skipped(SkipReason::NoChat));
        };
        // Resolve against the config list as it is right now.
        let Some(config) = find_config(self.configs.list(), &chat.assistant_id) else {
            debug!(
                thread_id = %chat.thread_id,
                assistant_id = %chat.assistant_id,
                "turn skipped: assistant not loaded"
            );
            return Ok(TurnOutcome::Skipped(SkipReason::UnknownAssistant {
                assistant_id: chat.assistant_id.clone(),
            }));
        };
        if config.config.is_null() {
            debug!(assistant_id = %chat.assistant_id, "turn skipped: assistant has no config");
            return Ok(TurnOutcome::Skipped(SkipReason::EmptyConfig {
                assistant_id: chat.assistant_id.clone(),
            }));
        }

        let messages = message
            .filter(|text| !text.is_empty())
            .map(|text| vec![TurnMessage::human(text)]);
        let resumed = messages.is_none();

        let released = self.release_stream();
        self.acquire_stream(released, messages, &chat.assistant_id, &chat.thread_id)
            .await?;

        Ok(TurnOutcome::Started {
            thread_id: chat.thread_id.clone(),
            resumed,
        })
    }

    /// Create a chat for the current assistant and send `message` as its first
    /// turn.
    pub async fn start_chat(&mut self, message: &str) -> Result<TurnOutcome, TurnError> {
        let Some(assistant_id) = self.configs.current().map(|c| c.assistant_id.clone()) else {
            debug!("chat creation skipped: no current assistant");
            return Ok(TurnOutcome::Skipped(SkipReason::NoConfig));
        };

        let chat = self.chats.create(message, &assistant_id).await?;
        info!(thread_id = %chat.thread_id, %assistant_id, "chat created");
        self.start_turn_in(Some(message), Some(&chat)).await
    }

    /// Switch to `thread_id`, or back to the top-level view for `None`.
    pub fn select_chat(&mut self, thread_id: Option<&str>) {
        let released = self.release_current();
        self.acquire_next(released, thread_id);

        if thread_id.is_none() {
            let first = self
                .configs
                .list()
                .and_then(|configs| configs.first())
                .map(|config| config.assistant_id.clone());
            self.configs.select(first.as_deref());
            self.ui.scroll_to_top();
        }

        if self.ui.sidebar_open {
            self.ui.close_sidebar();
        }
    }

    /// Make `assistant_id` current. Always leaves chat view.
    pub fn select_config(&mut self, assistant_id: Option<&str>) {
        let released = self.release_current();
        self.configs.select(assistant_id);
        self.acquire_next(released, None);
    }

    pub async fn save_config(
        &mut self,
        config: AssistantConfig,
    ) -> Result<AssistantConfig, StoreError> {
        self.configs.save(config).await
    }

    /// Give up the stream slot before the current chat is left. Stops
    /// whenever a chat is current, even if nothing appears to be running.
    pub fn release_current(&mut self) -> Released {
        if self.chats.current().is_some() || self.stream.status().is_running() {
            debug!(
                thread_id = self.chats.current().map(|chat| chat.thread_id.as_str()),
                "releasing stream before selection change"
            );
            self.stream.stop(true);
        }
        Released { _private: () }
    }

    /// Move the chat pointer once the previous chat's stream is released.
    pub fn acquire_next(&mut self, _released: Released, thread_id: Option<&str>) {
        self.chats.select(thread_id);
    }

    /// Give up the stream slot before a new turn. Only stops a live stream.
    pub fn release_stream(&mut self) -> Released {
        if self.stream.status().is_running() {
            debug!("stopping running stream before starting a new turn");
            self.stream.stop(true);
        }
        Released { _private: () }
    }

    /// Start the next stream once the slot is released.
    pub async fn acquire_stream(
        &mut self,
        _released: Released,
        messages: Option<Vec<TurnMessage>>,
        assistant_id: &str,
        thread_id: &str,
    ) -> Result<(), TurnError> {
        self.stream
            .start(messages, assistant_id, thread_id)
            .await
            .map_err(TurnError::from)
    }
}
