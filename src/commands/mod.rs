mod registry;

pub use registry::{all_commands, find_command, Command, CommandInvocation};

use serde_json::{json, Value};

use crate::core::app::AppAction;
use crate::core::assistant::AssistantConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Dispatch to the workspace.
    Action(AppAction),
    ListChats,
    ListAssistants,
    Help,
    Quit,
    ProcessAsMessage(String),
    /// Malformed invocation; the payload is the usage line to show.
    Usage(&'static str),
    /// Well-formed command with an argument that could not be used.
    Invalid(String),
}

pub fn process_input(input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => (command.handler)(CommandInvocation { args }),
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

/// One line per command, aligned on the usage column.
pub fn help_text() -> String {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    all_commands()
        .iter()
        .map(|command| format!("  {:width$}  {}", command.usage, command.help))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn handle_help(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Help
}

pub(super) fn handle_chats(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::ListChats
}

pub(super) fn handle_open(invocation: CommandInvocation<'_>) -> CommandResult {
    match invocation.argument() {
        Some(thread_id) => CommandResult::Action(AppAction::SelectChat {
            thread_id: Some(thread_id.to_string()),
        }),
        None => CommandResult::Usage("/open <thread-id>"),
    }
}

pub(super) fn handle_home(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Action(AppAction::SelectChat { thread_id: None })
}

pub(super) fn handle_assistants(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::ListAssistants
}

pub(super) fn handle_use(invocation: CommandInvocation<'_>) -> CommandResult {
    match invocation.argument() {
        Some(assistant_id) => CommandResult::Action(AppAction::SelectConfig {
            assistant_id: Some(assistant_id.to_string()),
        }),
        None => CommandResult::Usage("/use <assistant-id>"),
    }
}

/// `/new-assistant <name> [json-config]`. The name runs up to the first `{`.
pub(super) fn handle_new_assistant(invocation: CommandInvocation<'_>) -> CommandResult {
    let args = invocation.args.trim();
    let (name, raw_config) = match args.find('{') {
        Some(start) => (args[..start].trim(), Some(&args[start..])),
        None => (args, None),
    };
    if name.is_empty() {
        return CommandResult::Usage("/new-assistant <name> [json-config]");
    }

    let config = match raw_config {
        None => json!({ "configurable": {} }),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(config @ Value::Object(_)) => config,
            Ok(_) => {
                return CommandResult::Invalid(
                    "Assistant config must be a JSON object.".to_string(),
                )
            }
            Err(err) => {
                return CommandResult::Invalid(format!("Invalid assistant config: {err}"))
            }
        },
    };
    CommandResult::Action(AppAction::SaveConfig {
        config: AssistantConfig::draft(name, config),
    })
}

pub(super) fn handle_continue(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Action(AppAction::ContinueTurn)
}

pub(super) fn handle_stop(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Action(AppAction::StopStream)
}

pub(super) fn handle_sidebar(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Action(AppAction::ToggleSidebar)
}

pub(super) fn handle_quit(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}
