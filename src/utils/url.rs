//! Helpers for joining backend endpoints onto a configured base URL.

/// Strip trailing slashes so endpoint joins never produce `//`.
///
/// ```
/// use threadline::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8100/"), "http://localhost:8100");
/// assert_eq!(normalize_base_url("http://host/api///"), "http://host/api");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join `endpoint` onto `base_url`. A trailing slash on the endpoint is kept,
/// since the backend distinguishes `threads/` (list) from `threads` (create).
///
/// ```
/// use threadline::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8100/", "/runs/stream"),
///     "http://localhost:8100/runs/stream"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Accept only absolute http(s) URLs with a host part.
pub fn validate_base_url(base_url: &str) -> Result<(), String> {
    let trimmed = base_url.trim();
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| format!("'{trimmed}' must start with http:// or https://"))?;
    if rest.trim_start_matches('/').is_empty() || rest.starts_with('/') {
        return Err(format!("'{trimmed}' is missing a host"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_backend_endpoints() {
        let cases = [
            ("http://localhost:8100", "threads/", "http://localhost:8100/threads/"),
            ("http://localhost:8100/", "/threads", "http://localhost:8100/threads"),
            ("https://host/api//", "assistants/a1", "https://host/api/assistants/a1"),
            ("https://host", "///runs/stream", "https://host/runs/stream"),
        ];
        for (base, endpoint, expected) in cases {
            assert_eq!(construct_api_url(base, endpoint), expected);
        }
    }

    #[test]
    fn normalize_handles_degenerate_input() {
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn base_url_validation() {
        assert!(validate_base_url("http://localhost:8100").is_ok());
        assert!(validate_base_url(" https://gpts.example.org/ ").is_ok());
        assert!(validate_base_url("localhost:8100").is_err());
        assert!(validate_base_url("http://").is_err());
        assert!(validate_base_url("https:///path").is_err());
    }
}
