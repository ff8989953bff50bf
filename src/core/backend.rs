//! Shared HTTP plumbing for the assistants/threads/runs backend.

use reqwest::{Client, Method, RequestBuilder, Response};

use crate::utils::url::construct_api_url;

/// Cookie the backend reads to scope assistants and threads to a user.
pub const USER_ID_COOKIE: &str = "opengpts_user_id";

#[derive(Clone, Debug)]
pub struct Backend {
    client: Client,
    base_url: String,
    user_id: String,
}

impl Backend {
    pub fn new(client: Client, base_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            user_id: user_id.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = construct_api_url(&self.base_url, endpoint);
        self.client
            .request(method, url)
            .header(
                reqwest::header::COOKIE,
                format!("{}={}", USER_ID_COOKIE, self.user_id),
            )
    }
}

/// Split a response into success or `(status, body)` so callers can wrap it in
/// their own error type.
pub async fn ensure_success(response: Response) -> Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    Err((status.as_u16(), body))
}
