//! Provider adapters and the HTTP plumbing they share.

mod gnews;
mod newsapi;
mod rss;
mod rss_helpers;

pub use gnews::GNewsAdapter;
pub use newsapi::NewsApiAdapter;
pub use rss::RssAdapter;

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ProviderError;

/// Page size cap for keyword-search APIs.
pub(crate) const MAX_PAGE_SIZE: u32 = 20;

/// Build the HTTP client shared by every adapter.
///
/// # Errors
///
/// Returns [`ProviderError::Http`] if the client cannot be constructed.
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ProviderError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

/// Parse `base_url`, forcing exactly one trailing slash so relative joins
/// append to its path instead of replacing the last segment.
pub(crate) fn normalise_base_url(base_url: &str) -> Result<Url, ProviderError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// GET `url`, require a 2xx status, and parse the body as JSON.
pub(crate) async fn request_json(
    client: &Client,
    url: Url,
    provider: &'static str,
) -> Result<Value, ProviderError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::UnexpectedStatus {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
        context: provider.to_string(),
        source: e,
    })
}

/// Pull the `articles` array out of a keyword-search payload and decode each
/// record on its own, skipping the ones that do not fit `T`.
///
/// A payload without an `articles` array is an error, never a partial parse.
pub(crate) fn decode_articles<T: DeserializeOwned>(
    mut body: Value,
    provider: &'static str,
) -> Result<Vec<T>, ProviderError> {
    let Some(Value::Array(items)) = body.get_mut("articles").map(Value::take) else {
        return Err(ProviderError::MissingArticles { provider });
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<T>(item).ok())
        .collect();

    if decoded.len() < total {
        tracing::debug!(
            provider,
            skipped = total - decoded.len(),
            "skipped malformed article records"
        );
    }

    Ok(decoded)
}

/// Trimmed, non-empty copy of an optional upstream string.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
