use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::url::validate_base_url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8100";

/// Keys accepted by `threadline set` / `threadline unset`.
pub const CONFIG_KEYS: &[&str] = &["base-url", "user-id", "default-assistant", "log-filter"];

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Root of the assistants/threads/runs backend
    pub base_url: Option<String>,
    /// Identity sent to the backend; generated on first launch when unset
    pub user_id: Option<String>,
    /// Assistant selected at startup instead of the first one listed
    pub default_assistant: Option<String>,
    /// `tracing` filter used when `RUST_LOG` is not set (e.g. "threadline=debug")
    pub log_filter: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn set_key(&mut self, key: &str, value: String) -> Result<(), String> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(format!("A value is required for '{key}'"));
        }
        match key {
            "base-url" => {
                validate_base_url(&value)?;
                self.base_url = Some(value);
            }
            "user-id" => self.user_id = Some(value),
            "default-assistant" => self.default_assistant = Some(value),
            "log-filter" => self.log_filter = Some(value),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    pub fn unset_key(&mut self, key: &str) -> Result<(), String> {
        match key {
            "base-url" => self.base_url = None,
            "user-id" => self.user_id = None,
            "default-assistant" => self.default_assistant = None,
            "log-filter" => self.log_filter = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key}. Available keys: {}",
        CONFIG_KEYS.join(", ")
    )
}

/// A fresh random user id, hex encoded.
pub fn generate_user_id() -> Result<String, getrandom::Error> {
    let mut bytes = [0_u8; 16];
    getrandom::fill(&mut bytes)?;
    Ok(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
}
