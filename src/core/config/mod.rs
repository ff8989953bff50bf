pub mod data;
pub mod io;
pub mod orchestrator;
pub mod printing;

#[cfg(test)]
pub mod tests;

pub use data::Config;
pub use io::ConfigError;
pub use orchestrator::ConfigOrchestrator;
