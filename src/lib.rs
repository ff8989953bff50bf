//! Threadline is a terminal client for assistants/threads/runs chat backends.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the selection state (current chat, current assistant),
//!   the turn orchestration that keeps at most one run streaming, and the
//!   HTTP-backed stores and stream engine.
//! - [`ui`] prints views and runs the interactive line loop.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//! - [`api`] defines the payloads exchanged with the backend.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which loads settings and dispatches into
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
