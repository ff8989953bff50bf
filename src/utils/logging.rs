use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Pick the filter directive: `RUST_LOG` wins, then the config setting.
pub fn resolve_filter(env_value: Option<&str>, configured: Option<&str>) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .or(configured.filter(|value| !value.trim().is_empty()))
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Install the global subscriber. Writes to `log_file` when given, stderr
/// otherwise. Later calls are ignored.
pub fn init_tracing(
    configured_filter: Option<&str>,
    log_file: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_value = std::env::var("RUST_LOG").ok();
    let directive = resolve_filter(env_value.as_deref(), configured_filter);
    let filter = EnvFilter::try_new(&directive)?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_filter_takes_precedence() {
        assert_eq!(
            resolve_filter(Some("threadline=trace"), Some("info")),
            "threadline=trace"
        );
        assert_eq!(resolve_filter(Some("  "), Some("info")), "info");
        assert_eq!(resolve_filter(None, None), DEFAULT_FILTER);
    }

    #[test]
    fn init_tracing_accepts_file_target() {
        let temp_dir = tempfile::TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("threadline.log");
        init_tracing(Some("debug"), path.to_str()).expect("init should succeed");
        assert!(path.exists());
    }
}
