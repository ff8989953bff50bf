use crate::core::config::data::{Config, DEFAULT_BASE_URL};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset, using {DEFAULT_BASE_URL})"),
        }
        match &self.user_id {
            Some(user_id) => println!("  user-id: {user_id}"),
            None => println!("  user-id: (unset)"),
        }
        match &self.default_assistant {
            Some(assistant) => println!("  default-assistant: {assistant}"),
            None => println!("  default-assistant: (unset)"),
        }
        match &self.log_filter {
            Some(filter) => println!("  log-filter: {filter}"),
            None => println!("  log-filter: (unset)"),
        }
    }
}
