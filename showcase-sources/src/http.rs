//! Shared HTTP plumbing for the source adapters.

use std::time::Duration;

use serde::de::DeserializeOwned;
use showcase_core::{ShowcaseError, ShowcaseResult};
use tracing::debug;
use url::Url;

/// Adapters own their request timeouts; the cache never cancels a fetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameters whose values never appear in logs.
const SECRET_PARAMS: &[&str] = &["key", "api_key", "token"];

/// Build a client identifying itself as `user_agent`.
pub fn client(user_agent: &str) -> ShowcaseResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ShowcaseError::Http(e.to_string()))
}

/// GET `url` and return the body, failing on any non-2xx status.
pub async fn get_text(client: &reqwest::Client, url: &Url, accept: &str) -> ShowcaseResult<String> {
    debug!("GET {}", redact(url));

    let resp = client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, accept)
        .send()
        .await
        .map_err(request_error)?;

    let status = resp.status();
    let body = resp.text().await.map_err(request_error)?;

    if !status.is_success() {
        return Err(ShowcaseError::Remote {
            status: status.as_u16(),
            message: truncate_body(&body),
        });
    }

    Ok(body)
}

/// GET `url` and deserialize the JSON body.
pub async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: &Url) -> ShowcaseResult<T> {
    let body = get_text(client, url, "application/json").await?;
    serde_json::from_str(&body).map_err(|e| ShowcaseError::Parse(e.to_string()))
}

/// `url` with secret query values replaced by `***`.
pub fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| SECRET_PARAMS.contains(&k.as_ref())) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if SECRET_PARAMS.contains(&k.as_ref()) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

// reqwest errors include the request URL, which may carry an API key.
fn request_error(e: reqwest::Error) -> ShowcaseError {
    ShowcaseError::Http(e.without_url().to_string())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX {
        return trimmed.to_string();
    }
    trimmed.chars().take(MAX).collect::<String>() + "..."
}
