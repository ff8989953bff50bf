//! Plain-text rendering for the line-oriented chat loop. Every function here
//! returns a `String` so the loop decides where output goes.

use crate::api::{MessageType, StreamedMessage};
use crate::core::app::{ContentView, SkipReason};
use crate::core::assistant::AssistantConfig;
use crate::core::chat::Chat;

pub fn content_header(view: &ContentView<'_>) -> String {
    match view {
        ContentView::Chat(chat) => format!("── {} [{}] ──", chat_title(chat), chat.thread_id),
        ContentView::NewChat(config) => format!(
            "── new chat with {} [{}] ── type a message to start",
            config.name, config.assistant_id
        ),
        ContentView::ConfigEditor => "── no assistant selected ── /use <assistant-id> picks one from \
             /assistants, /new-assistant <name> [json-config] creates one"
            .to_string(),
    }
}

fn chat_title(chat: &Chat) -> &str {
    if chat.name.trim().is_empty() {
        "untitled chat"
    } else {
        &chat.name
    }
}

pub fn chat_list(chats: Option<Vec<&Chat>>, current: Option<&str>) -> String {
    let Some(chats) = chats else {
        return "Chats are still loading.".to_string();
    };
    if chats.is_empty() {
        return "No chats yet.".to_string();
    }
    chats
        .iter()
        .map(|chat| {
            let marker = if current == Some(chat.thread_id.as_str()) {
                '*'
            } else {
                ' '
            };
            format!("{marker} {}  {}", chat.thread_id, chat_title(chat))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn assistant_list(configs: Option<&[AssistantConfig]>, current: Option<&str>) -> String {
    let Some(configs) = configs else {
        return "Assistants are still loading.".to_string();
    };
    if configs.is_empty() {
        return "No assistants available.".to_string();
    }
    configs
        .iter()
        .map(|config| {
            let marker = if current == Some(config.assistant_id.as_str()) {
                '*'
            } else {
                ' '
            };
            let visibility = if config.public { " (public)" } else { "" };
            format!(
                "{marker} {}  {}{visibility}",
                config.assistant_id, config.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn skip_message(reason: &SkipReason) -> String {
    match reason {
        SkipReason::NoChat => "No chat is open.".to_string(),
        SkipReason::NoConfig => "Select an assistant before sending a message.".to_string(),
        SkipReason::UnknownAssistant { assistant_id } => {
            format!("This chat's assistant '{assistant_id}' is no longer available.")
        }
        SkipReason::EmptyConfig { assistant_id } => {
            format!("Assistant '{assistant_id}' has no configuration to run with.")
        }
    }
}

/// Turns full-snapshot stream updates into printable increments of the
/// latest assistant reply.
///
/// A reply is identified by its position in the snapshot and its id, since
/// ids are optional on the wire.
#[derive(Debug, Default)]
pub struct ReplyPrinter {
    reply: Option<(usize, Option<String>)>,
    printed: String,
}

impl ReplyPrinter {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn delta(&mut self, messages: &[StreamedMessage]) -> Option<String> {
        let (index, latest) = messages
            .iter()
            .enumerate()
            .rev()
            .find(|(_, message)| message.kind == MessageType::Ai)?;
        let text = latest.text();
        let key = (index, latest.id.clone());

        let mut separator = "";
        if self.reply.as_ref() != Some(&key) || !text.starts_with(&self.printed) {
            if !self.printed.is_empty() {
                separator = "\n";
            }
            self.reply = Some(key);
            self.printed.clear();
        }
        if text.len() == self.printed.len() {
            return None;
        }

        let fresh = format!("{separator}{}", &text[self.printed.len()..]);
        self.printed = text;
        Some(fresh)
    }
}
