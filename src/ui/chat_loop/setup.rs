use std::error::Error;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::core::app::view::find_config;
use crate::core::app::Workspace;
use crate::core::assistant::{AssistantConfig, ConfigStore, RemoteConfigStore};
use crate::core::backend::Backend;
use crate::core::chat::RemoteChatStore;
use crate::core::chat_stream::{HttpStreamEngine, StreamMessage};
use crate::ui::renderer::ReplyPrinter;

pub type LiveWorkspace = Workspace<RemoteChatStore, RemoteConfigStore, HttpStreamEngine>;

/// Connection settings after config file and CLI flags have been merged.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub base_url: String,
    pub user_id: String,
    pub default_assistant: Option<String>,
}

pub struct ChatSession {
    pub workspace: LiveWorkspace,
    pub events: mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    pub printer: ReplyPrinter,
}

/// Load both lists from the backend and select the startup assistant.
pub async fn bootstrap_session(options: &ChatOptions) -> Result<ChatSession, Box<dyn Error>> {
    let client = reqwest::Client::builder().build()?;
    let backend = Backend::new(client, options.base_url.clone(), options.user_id.clone());
    bootstrap_with_backend(backend, options.default_assistant.as_deref()).await
}

pub(crate) async fn bootstrap_with_backend(
    backend: Backend,
    preferred: Option<&str>,
) -> Result<ChatSession, Box<dyn Error>> {
    info!(
        base_url = backend.base_url(),
        user_id = backend.user_id(),
        "connecting to backend"
    );
    let mut chats = RemoteChatStore::new(backend.clone());
    let mut configs = RemoteConfigStore::new(backend.clone());
    let (stream, events) = HttpStreamEngine::new(backend);

    configs.refresh().await?;
    chats.refresh().await?;

    let mut workspace = Workspace::new(chats, configs, stream);
    let startup = startup_assistant(workspace.configs.list(), preferred)
        .map(|config| config.assistant_id.clone());
    if let (Some(wanted), Some(selected)) = (preferred, startup.as_deref()) {
        if wanted != selected {
            warn!(wanted, selected, "default assistant not found");
            eprintln!("{}", workspace.configs.describe_missing(wanted));
        }
    }
    info!(assistant = ?startup, "starting session");
    workspace.controller().select_config(startup.as_deref());

    Ok(ChatSession {
        workspace,
        events,
        printer: ReplyPrinter::default(),
    })
}

/// The preferred assistant when it exists, otherwise the first one listed.
pub(crate) fn startup_assistant<'a>(
    configs: Option<&'a [AssistantConfig]>,
    preferred: Option<&str>,
) -> Option<&'a AssistantConfig> {
    preferred
        .and_then(|assistant_id| find_config(configs, assistant_id))
        .or_else(|| configs?.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::assistant;

    #[test]
    fn preferred_assistant_wins_when_present() {
        let configs = vec![assistant("a1", "Helper"), assistant("a2", "Coder")];
        let chosen = startup_assistant(Some(&configs), Some("a2")).map(|c| c.assistant_id.as_str());
        assert_eq!(chosen, Some("a2"));
    }

    #[test]
    fn falls_back_to_first_assistant() {
        let configs = vec![assistant("a1", "Helper"), assistant("a2", "Coder")];
        let chosen =
            startup_assistant(Some(&configs), Some("gone")).map(|c| c.assistant_id.as_str());
        assert_eq!(chosen, Some("a1"));
        let chosen = startup_assistant(Some(&configs), None).map(|c| c.assistant_id.as_str());
        assert_eq!(chosen, Some("a1"));
    }

    #[test]
    fn nothing_to_select_without_assistants() {
        assert!(startup_assistant(Some(&[]), Some("a1")).is_none());
        assert!(startup_assistant(None, None).is_none());
    }
}
