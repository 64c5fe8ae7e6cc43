//! NewsAPI `/v2/everything` keyword-search adapter.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use sportsfeed_core::{parse_published_at, SourceType, UnifiedArticle};

use super::{decode_articles, non_blank, normalise_base_url, request_json, MAX_PAGE_SIZE};
use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;
use crate::types::{AdapterKind, ProviderQuery};

const DEFAULT_BASE_URL: &str = "https://newsapi.org/";
const PROVIDER: &str = "newsapi";
/// Title NewsAPI substitutes for articles pulled by the publisher.
const REMOVED_TITLE: &str = "[Removed]";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

impl NewsApiArticle {
    fn into_unified(self) -> Option<UnifiedArticle> {
        let title = non_blank(self.title).filter(|t| t != REMOVED_TITLE)?;
        let source = non_blank(self.source.and_then(|s| s.name))
            .unwrap_or_else(|| "NewsAPI".to_string());

        Some(UnifiedArticle {
            title,
            description: non_blank(self.description),
            url: non_blank(self.url).unwrap_or_default(),
            source,
            published_at: parse_published_at(self.published_at.as_deref()),
            source_type: SourceType::Newsapi,
            image_url: non_blank(self.url_to_image),
            paywalled: false,
        })
    }
}

/// Adapter for the NewsAPI keyword search.
pub struct NewsApiAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl NewsApiAdapter {
    /// Creates an adapter pointed at the production NewsAPI.
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
        url.set_path(&format!("{}v2/everything", self.base_url.path()));
        url.query_pairs_mut()
            .append_pair("q", keywords)
            .append_pair("from", &from.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("language", "en")
            .append_pair("sortBy", "publishedAt")
            .append_pair("pageSize", &MAX_PAGE_SIZE.to_string())
            .append_pair("apiKey", api_key);
        url
    }
}

#[async_trait]
impl ProviderAdapter for NewsApiAdapter {
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

        let articles: Vec<UnifiedArticle> = decode_articles::<NewsApiArticle>(body, PROVIDER)?
            .into_iter()
            .filter_map(NewsApiArticle::into_unified)
            .collect();

        tracing::debug!(provider = PROVIDER, count = articles.len(), "fetched articles");
        Ok(articles)
    }
}
