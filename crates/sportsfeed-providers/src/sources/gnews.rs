//! GNews `/api/v4/search` keyword-search adapter.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use sportsfeed_core::{parse_published_at, SourceType, UnifiedArticle};

use super::{decode_articles, non_blank, normalise_base_url, request_json, MAX_PAGE_SIZE};
use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;
use crate::types::{AdapterKind, ProviderQuery};

const DEFAULT_BASE_URL: &str = "https://gnews.io/";
const PROVIDER: &str = "gnews";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GNewsArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    image: Option<String>,
    published_at: Option<String>,
    #[serde(default)]
    source: Option<GNewsSource>,
}

#[derive(Debug, Deserialize)]
struct GNewsSource {
    name: Option<String>,
}

impl GNewsArticle {
    fn into_unified(self) -> Option<UnifiedArticle> {
        let title = non_blank(self.title)?;
        let source =
            non_blank(self.source.and_then(|s| s.name)).unwrap_or_else(|| "GNews".to_string());

        Some(UnifiedArticle {
            title,
            description: non_blank(self.description),
            url: non_blank(self.url).unwrap_or_default(),
            source,
            published_at: parse_published_at(self.published_at.as_deref()),
            source_type: SourceType::Gnews,
            image_url: non_blank(self.image),
            paywalled: false,
        })
    }
}

/// Adapter for the GNews keyword search.
pub struct GNewsAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl GNewsAdapter {
    /// Creates an adapter pointed at the production GNews API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidBaseUrl`] only if the built-in URL is invalid.
    pub fn new(client: Client, api_key: Option<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Creates an adapter with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        api_key: Option<String>,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client,
            api_key,
            base_url: normalise_base_url(base_url)?,
        })
    }

    fn build_url(&self, api_key: &str, keywords: &str, from: DateTime<Utc>) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}api/v4/search", self.base_url.path()));
        url.query_pairs_mut()
            .append_pair("q", keywords)
            .append_pair("from", &from.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("lang", "en")
            .append_pair("max", &MAX_PAGE_SIZE.to_string())
            .append_pair("apikey", api_key);
        url
    }
}

#[async_trait]
impl ProviderAdapter for GNewsAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::KeywordSearch
    }

    async fn try_fetch(
        &self,
        query: &ProviderQuery,
        since_hours: u32,
    ) -> Result<Vec<UnifiedArticle>, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::MissingApiKey { provider: PROVIDER });
        };
        if query.keywords.trim().is_empty() {
            return Ok(Vec::new());
        }

        let from = Utc::now() - Duration::hours(i64::from(since_hours));
        let url = self.build_url(api_key, &query.keywords, from);
        let body = request_json(&self.client, url, PROVIDER).await?;

        let articles: Vec<UnifiedArticle> = decode_articles::<GNewsArticle>(body, PROVIDER)?
            .into_iter()
            .filter_map(GNewsArticle::into_unified)
            .collect();

        tracing::debug!(provider = PROVIDER, count = articles.len(), "fetched articles");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sportsfeed_core::DedupKey;

    #[test]
    fn build_url_has_expected_query() {
        let adapter =
            GNewsAdapter::with_base_url(Client::new(), Some("k".to_string()), "https://gnews.io")
                .expect("adapter");
        let from = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let url = adapter.build_url("k", "\"nfl\" OR \"nba\"", from);
        assert_eq!(
            url.as_str(),
            "https://gnews.io/api/v4/search?q=%22nfl%22+OR+%22nba%22\
             &from=2026-03-01T00%3A00%3A00Z&lang=en&max=20&apikey=k"
        );
    }

    #[test]
    fn article_without_title_is_dropped() {
        let article = GNewsArticle {
            title: Some("  ".to_string()),
            description: None,
            url: Some("https://example.com".to_string()),
            image: None,
            published_at: None,
            source: None,
        };
        assert!(article.into_unified().is_none());
    }

    #[test]
    fn missing_url_maps_to_empty_string() {
        let article = GNewsArticle {
            title: Some("Chiefs sign receiver".to_string()),
            description: None,
            url: None,
            image: Some("https://img.example.com/1.jpg".to_string()),
            published_at: Some("not a date".to_string()),
            source: Some(GNewsSource {
                name: Some("CBS Sports".to_string()),
            }),
        };
        let unified = article.into_unified().expect("mapped");
        assert_eq!(unified.url, "");
        assert_eq!(
            unified.dedup_key(),
            DedupKey::Title("Chiefs sign receiver".to_string())
        );
        assert_eq!(unified.published_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(unified.source_type, SourceType::Gnews);
    }
}
