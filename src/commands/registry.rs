use super::CommandResult;

pub type CommandHandler = fn(CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    /// The single argument, or `None` when absent.
    pub fn argument(&self) -> Option<&'a str> {
        let args = self.args.trim();
        (!args.is_empty()).then_some(args)
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "chats",
        usage: "/chats",
        help: "List chats whose assistant still exists.",
        handler: super::handle_chats,
    },
    Command {
        name: "open",
        usage: "/open <thread-id>",
        help: "Switch to an existing chat.",
        handler: super::handle_open,
    },
    Command {
        name: "home",
        usage: "/home",
        help: "Leave the current chat and start a new one from the current assistant.",
        handler: super::handle_home,
    },
    Command {
        name: "assistants",
        usage: "/assistants",
        help: "List available assistants.",
        handler: super::handle_assistants,
    },
    Command {
        name: "use",
        usage: "/use <assistant-id>",
        help: "Select the assistant used for new chats.",
        handler: super::handle_use,
    },
    Command {
        name: "new-assistant",
        usage: "/new-assistant <name> [json-config]",
        help: "Create an assistant and select it. The config defaults to {\"configurable\": {}}.",
        handler: super::handle_new_assistant,
    },
    Command {
        name: "continue",
        usage: "/continue",
        help: "Resume the current chat without sending a message.",
        handler: super::handle_continue,
    },
    Command {
        name: "stop",
        usage: "/stop",
        help: "Stop the running response and keep what arrived.",
        handler: super::handle_stop,
    },
    Command {
        name: "sidebar",
        usage: "/sidebar",
        help: "Toggle the chat list shown before each prompt.",
        handler: super::handle_sidebar,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Exit threadline.",
        handler: super::handle_quit,
    },
];
