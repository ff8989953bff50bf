//! Command-line interface parsing and handling

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::core::assistant::ConfigStore;
use crate::core::config::data::{generate_user_id, path_display, Config};
use crate::core::config::ConfigOrchestrator;
use crate::ui::chat_loop::{bootstrap_session, run_chat, ChatOptions};
use crate::ui::renderer::{assistant_list, chat_list};
use crate::utils::logging::init_tracing;
use crate::utils::url::validate_base_url;

#[derive(Parser)]
#[command(name = "threadline")]
#[command(about = "A terminal client for assistants/threads/runs chat backends")]
#[command(
    long_about = "Threadline talks to an assistants/threads/runs backend. Pick an assistant, \
start chats with it, and watch replies stream in.\n\n\
Commands inside a chat:\n\
  /help             List every slash command\n\
  /chats            List chats\n\
  /open <thread>    Switch to a chat\n\
  /use <assistant>  Select the assistant for new chats\n\
  /new-assistant    Create an assistant: /new-assistant <name> [json-config]\n\
  /quit             Exit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend root URL (overrides the configured base-url)
    #[arg(short = 'b', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// User identity sent to the backend (overrides the configured user-id)
    #[arg(short = 'u', long, global = true, value_name = "ID")]
    pub user_id: Option<String>,

    /// Append logs to the specified file instead of stderr
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// List assistants available to this user
    Assistants,
    /// List chats whose assistant still exists
    Threads,
    /// Set a configuration value, or print all values when none is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let orchestrator = ConfigOrchestrator::new(Config::get_config_path()?);
    let config = orchestrator.load()?;
    init_tracing(config.log_filter.as_deref(), args.log.as_deref())?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Set { key: None, .. } => {
            println!("Config file: {}", path_display(orchestrator.path()));
            config.print_all();
            Ok(())
        }
        Commands::Set {
            key: Some(key),
            value,
        } => {
            let value = value.join(" ");
            orchestrator.mutate(|config| {
                config.set_key(&key, value.clone())?;
                Ok(())
            })?;
            println!("✅ Set {key} to: {}", value.trim());
            Ok(())
        }
        Commands::Unset { key } => {
            orchestrator.mutate(|config| {
                config.unset_key(&key)?;
                Ok(())
            })?;
            println!("✅ Unset {key}");
            Ok(())
        }
        command => {
            let options = resolve_options(
                &orchestrator,
                config,
                args.base_url.as_deref(),
                args.user_id.as_deref(),
            )?;
            match command {
                Commands::Assistants => {
                    let session = bootstrap_session(&options).await?;
                    let workspace = &session.workspace;
                    let current = workspace
                        .current_config()
                        .map(|config| config.assistant_id.as_str());
                    println!("{}", assistant_list(workspace.configs.list(), current));
                    Ok(())
                }
                Commands::Threads => {
                    let session = bootstrap_session(&options).await?;
                    println!("{}", chat_list(session.workspace.visible_chats(), None));
                    Ok(())
                }
                _ => run_chat(options).await,
            }
        }
    }
}

/// Merge flags over the config file. A missing user id is generated once and
/// saved so later sessions see the same threads.
fn resolve_options(
    orchestrator: &ConfigOrchestrator,
    config: Config,
    base_url: Option<&str>,
    user_id: Option<&str>,
) -> Result<ChatOptions, Box<dyn Error>> {
    if let Some(flag) = base_url {
        validate_base_url(flag)?;
    }
    let user_id = match (user_id, &config.user_id) {
        (Some(flag), _) => flag.to_string(),
        (None, Some(saved)) => saved.clone(),
        (None, None) => {
            let generated = generate_user_id()?;
            orchestrator.mutate(|config| {
                config.user_id = Some(generated.clone());
                Ok(())
            })?;
            info!(path = %path_display(orchestrator.path()), "generated user id");
            generated
        }
    };

    Ok(ChatOptions {
        base_url: base_url
            .unwrap_or_else(|| config.effective_base_url())
            .to_string(),
        user_id,
        default_assistant: config.default_assistant,
    })
}
