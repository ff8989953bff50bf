//! Derived views over the selection state. Nothing here holds state; every
//! function is recomputed from the stores on each call.

use crate::core::assistant::AssistantConfig;
use crate::core::chat::Chat;

/// What the main content area shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentView<'a> {
    Chat(&'a Chat),
    NewChat(&'a AssistantConfig),
    ConfigEditor,
}

pub fn select_content<'a>(
    current_chat: Option<&'a Chat>,
    current_config: Option<&'a AssistantConfig>,
) -> ContentView<'a> {
    match (current_chat, current_config) {
        (Some(chat), _) => ContentView::Chat(chat),
        (None, Some(config)) => ContentView::NewChat(config),
        (None, None) => ContentView::ConfigEditor,
    }
}

pub fn find_config<'a>(
    configs: Option<&'a [AssistantConfig]>,
    assistant_id: &str,
) -> Option<&'a AssistantConfig> {
    configs?
        .iter()
        .find(|config| config.assistant_id == assistant_id)
}

/// Chats whose assistant still exists. `None` while either list is unloaded,
/// so "loading" never looks like "empty".
pub fn visible_chats<'a>(
    chats: Option<&'a [Chat]>,
    configs: Option<&[AssistantConfig]>,
) -> Option<Vec<&'a Chat>> {
    let (chats, configs) = (chats?, configs?);
    Some(
        chats
            .iter()
            .filter(|chat| {
                configs
                    .iter()
                    .any(|config| config.assistant_id == chat.assistant_id)
            })
            .collect(),
    )
}
