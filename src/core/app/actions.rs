use super::{ContentView, SkipReason, TurnOutcome, Workspace};
use crate::core::assistant::{AssistantConfig, ConfigStore};
use crate::core::chat::ChatStore;
use crate::core::chat_stream::StreamEngine;
use crate::core::errors::TurnError;

/// User intents the presentation layer can dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Send text from whichever composer is visible.
    SubmitMessage { message: String },
    /// Resume the current chat without new input.
    ContinueTurn,
    SelectChat { thread_id: Option<String> },
    SelectConfig { assistant_id: Option<String> },
    SaveConfig { config: AssistantConfig },
    /// Stop the stream but keep what it produced.
    StopStream,
    ToggleSidebar,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    Turn(TurnOutcome),
    Saved(AssistantConfig),
    Updated,
}

enum Composer {
    Chat,
    NewChat,
    None,
}

pub async fn apply_action<C, K, S>(
    workspace: &mut Workspace<C, K, S>,
    action: AppAction,
) -> Result<ActionResult, TurnError>
where
    C: ChatStore,
    K: ConfigStore,
    S: StreamEngine,
{
    match action {
        AppAction::SubmitMessage { message } => {
            let composer = match workspace.visible_content() {
                ContentView::Chat(_) => Composer::Chat,
                ContentView::NewChat(_) => Composer::NewChat,
                ContentView::ConfigEditor => Composer::None,
            };
            let outcome = match composer {
                Composer::Chat => workspace.controller().start_turn(Some(&message)).await?,
                Composer::NewChat => workspace.controller().start_chat(&message).await?,
                Composer::None => TurnOutcome::Skipped(SkipReason::NoConfig),
            };
            Ok(ActionResult::Turn(outcome))
        }
        AppAction::ContinueTurn => {
            let outcome = workspace.controller().start_turn(None).await?;
            Ok(ActionResult::Turn(outcome))
        }
        AppAction::SelectChat { thread_id } => {
            workspace.controller().select_chat(thread_id.as_deref());
            Ok(ActionResult::Updated)
        }
        AppAction::SelectConfig { assistant_id } => {
            workspace.controller().select_config(assistant_id.as_deref());
            Ok(ActionResult::Updated)
        }
        AppAction::SaveConfig { config } => {
            let saved = workspace.controller().save_config(config).await?;
            Ok(ActionResult::Saved(saved))
        }
        AppAction::StopStream => {
            workspace.stream.stop(false);
            Ok(ActionResult::Updated)
        }
        AppAction::ToggleSidebar => {
            workspace.ui.toggle_sidebar();
            Ok(ActionResult::Updated)
        }
    }
}
