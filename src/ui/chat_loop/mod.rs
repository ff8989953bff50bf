//! Line-oriented chat loop.
//!
//! Reads commands and messages from stdin while the active run streams in,
//! dispatching both into the [`Workspace`](crate::core::app::Workspace).

mod setup;

pub use self::setup::{bootstrap_session, ChatOptions, ChatSession, LiveWorkspace};

use std::error::Error;
use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::commands::{help_text, process_input, CommandResult};
use crate::core::app::{apply_action, ActionResult, AppAction, TurnOutcome};
use crate::core::assistant::ConfigStore;
use crate::core::chat_stream::{StreamEngine, StreamMessage, StreamStatus};
use crate::ui::renderer::{assistant_list, chat_list, content_header, skip_message};

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoopControl {
    /// Keep reading; the text is printed as a block when non-empty.
    Continue(String),
    Quit,
}

pub async fn run_chat(options: ChatOptions) -> Result<(), Box<dyn Error>> {
    let mut session = bootstrap_session(&options).await?;
    println!("{}", render_view(&session));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match handle_line(&mut session, &line).await {
                    LoopControl::Quit => break,
                    LoopControl::Continue(output) if !output.is_empty() => println!("{output}"),
                    LoopControl::Continue(_) => {}
                }
            }
            Some((message, stream_id)) = session.events.recv() => {
                if let Some(text) = handle_stream_event(&mut session, message, stream_id) {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
            }
        }
    }

    session.workspace.stream.stop(false);
    Ok(())
}

async fn handle_line(session: &mut ChatSession, line: &str) -> LoopControl {
    if line.trim().is_empty() {
        return LoopControl::Continue(String::new());
    }

    let output = match process_input(line) {
        CommandResult::Quit => return LoopControl::Quit,
        CommandResult::Help => help_text(),
        CommandResult::Usage(usage) => format!("Usage: {usage}"),
        CommandResult::Invalid(message) => message,
        CommandResult::ListChats => {
            let workspace = &session.workspace;
            let current = workspace.current_chat().map(|chat| chat.thread_id.as_str());
            chat_list(workspace.visible_chats(), current)
        }
        CommandResult::ListAssistants => {
            let workspace = &session.workspace;
            let current = workspace
                .current_config()
                .map(|config| config.assistant_id.as_str());
            assistant_list(workspace.configs.list(), current)
        }
        CommandResult::ProcessAsMessage(message) => {
            dispatch(session, AppAction::SubmitMessage { message }).await
        }
        CommandResult::Action(action) => match missing_target(session, &action) {
            Some(missing) => missing,
            None => dispatch(session, action).await,
        },
    };
    LoopControl::Continue(output)
}

/// Reject `/open` and `/use` targets that are not loaded.
fn missing_target(session: &ChatSession, action: &AppAction) -> Option<String> {
    let workspace = &session.workspace;
    match action {
        AppAction::SelectChat {
            thread_id: Some(thread_id),
        } if workspace.chats.find(thread_id).is_none() => {
            Some(workspace.chats.describe_missing(thread_id))
        }
        AppAction::SelectConfig {
            assistant_id: Some(assistant_id),
        } if workspace.configs.find(assistant_id).is_none() => {
            Some(workspace.configs.describe_missing(assistant_id))
        }
        _ => None,
    }
}

async fn dispatch(session: &mut ChatSession, action: AppAction) -> String {
    debug!(?action, "dispatching");
    match apply_action(&mut session.workspace, action).await {
        Ok(ActionResult::Turn(TurnOutcome::Started { thread_id, resumed })) => {
            session.printer.reset();
            debug!(%thread_id, resumed, "turn started");
            if resumed {
                "(continuing)".to_string()
            } else {
                String::new()
            }
        }
        Ok(ActionResult::Turn(TurnOutcome::Skipped(reason))) => skip_message(&reason),
        Ok(ActionResult::Saved(config)) => format!(
            "Saved assistant {} [{}]\n{}",
            config.name,
            config.assistant_id,
            render_view(session)
        ),
        Ok(ActionResult::Updated) => render_view(session),
        Err(err) => {
            warn!(error = %err, "action failed");
            format!("Error: {err}")
        }
    }
}

/// Apply one stream event and return whatever should be printed for it.
///
/// A failed run delivers `Error` and then `End`; the failure is reported once,
/// when `End` arrives.
fn handle_stream_event(
    session: &mut ChatSession,
    message: StreamMessage,
    stream_id: u64,
) -> Option<String> {
    let finished = message == StreamMessage::End;
    if !session.workspace.stream.apply(message, stream_id) {
        return None;
    }

    let mut output = session
        .printer
        .delta(session.workspace.stream.messages())
        .unwrap_or_default();
    if finished {
        if let StreamStatus::Failed { message, .. } = session.workspace.stream.status() {
            output.push('\n');
            output.push_str(message);
        }
        output.push('\n');
    }
    (!output.is_empty()).then_some(output)
}

fn render_view(session: &ChatSession) -> String {
    let workspace = &session.workspace;
    let header = content_header(&workspace.visible_content());
    if !workspace.ui.sidebar_open {
        return header;
    }
    let current = workspace.current_chat().map(|chat| chat.thread_id.as_str());
    format!("{}\n{header}", chat_list(workspace.visible_chats(), current))
}
