use crate::core::assistant::{AssistantConfig, ConfigStore};
use crate::core::chat::{Chat, ChatStore};
use crate::core::chat_stream::StreamEngine;

pub mod actions;
pub mod turns;
pub mod ui_state;
pub mod view;


pub use actions::{apply_action, ActionResult, AppAction};
pub use turns::{Released, SkipReason, TurnController, TurnOutcome};
pub use ui_state::UiState;
pub use view::ContentView;

/// Owns the three collaborators plus the UI state they drive. All mutation goes
/// through [`Workspace::controller`]; everything else is a derived read.
pub struct Workspace<C, K, S> {
    pub chats: C,
    pub configs: K,
    pub stream: S,
    pub ui: UiState,
}

impl<C, K, S> Workspace<C, K, S>
where
    C: ChatStore,
    K: ConfigStore,
    S: StreamEngine,
{
    pub fn new(chats: C, configs: K, stream: S) -> Self {
        Self {
            chats,
            configs,
            stream,
            ui: UiState::default(),
        }
    }

    pub fn controller(&mut self) -> TurnController<'_, C, K, S> {
        TurnController::new(
            &mut self.chats,
            &mut self.configs,
            &mut self.stream,
            &mut self.ui,
        )
    }

    pub fn current_chat(&self) -> Option<&Chat> {
        self.chats.current()
    }

    pub fn current_config(&self) -> Option<&AssistantConfig> {
        self.configs.current()
    }

    pub fn visible_chats(&self) -> Option<Vec<&Chat>> {
        view::visible_chats(self.chats.list(), self.configs.list())
    }

    pub fn visible_content(&self) -> ContentView<'_> {
        view::select_content(self.chats.current(), self.configs.current())
    }

    /// Assistant answering in the current chat, if both are known.
    pub fn current_chat_config(&self) -> Option<&AssistantConfig> {
        let chat = self.chats.current()?;
        view::find_config(self.configs.list(), &chat.assistant_id)
    }
}
