pub mod app;
pub mod assistant;
pub mod backend;
pub mod chat;
pub mod chat_stream;
pub mod config;
pub mod errors;
pub(crate) mod shared_selection;
