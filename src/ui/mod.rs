//! Terminal layer for interactive chat sessions.
//!
//! - [`chat_loop`]: reads input, dispatches it through [`crate::commands`],
//!   and prints stream progress from [`crate::core::chat_stream`].
//! - [`renderer`]: plain-text views of the workspace state.
//!
//! This layer only presents; [`crate::core`] owns selection and turn logic.

pub mod chat_loop;
pub mod renderer;
