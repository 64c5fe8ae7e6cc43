//! Fan-out over every registered adapter, then merge, dedup, flag, and sort.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use sportsfeed_core::{AppConfig, PaywallList, SourcesFile, UnifiedArticle};

use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;
use crate::sources::{build_http_client, GNewsAdapter, NewsApiAdapter, RssAdapter};
use crate::types::{
    AggregationReport, AggregatorConfig, ProviderQuery, ProviderReport, ProviderStatus,
};

/// Read-only aggregation context built once at startup.
pub struct Aggregator {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    sources: SourcesFile,
    paywall: PaywallList,
    config: AggregatorConfig,
}

impl Aggregator {
    /// An aggregator with no adapters registered.
    #[must_use]
    pub fn new(sources: SourcesFile, config: AggregatorConfig) -> Self {
        let paywall = sources.paywall_list();
        Self {
            adapters: Vec::new(),
            sources,
            paywall,
            config,
        }
    }

    /// Register `adapter`. Keyword-search adapters always stay ahead of feeds;
    /// within a kind, registration order is kept.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.push(adapter);
        self.adapters.sort_by_key(|a| a.kind());
        self
    }

    /// Build the production aggregator: NewsAPI, GNews, then the RSS feeds,
    /// all sharing one HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig, sources: SourcesFile) -> Result<Self, ProviderError> {
        let client = build_http_client(config.http_timeout_secs, &config.http_user_agent)?;
        let aggregator_config = AggregatorConfig {
            keyword_window_hours: config.keyword_window_hours,
            feed_window_hours: config.feed_window_hours,
        };

        let newsapi = NewsApiAdapter::new(client.clone(), config.newsapi_api_key.clone())?;
        let gnews = GNewsAdapter::new(client.clone(), config.gnews_api_key.clone())?;
        let rss = RssAdapter::new(client);

        Ok(Self::new(sources, aggregator_config)
            .with_adapter(Arc::new(newsapi))
            .with_adapter(Arc::new(gnews))
            .with_adapter(Arc::new(rss)))
    }

    /// Registered adapter names in merge order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Every topic named in the sources file; used by scheduled ingestion.
    #[must_use]
    pub fn default_topics(&self) -> Vec<String> {
        self.sources.topic_names()
    }

    #[must_use]
    pub fn build_query<S: AsRef<str>>(&self, topics: &[S]) -> ProviderQuery {
        ProviderQuery {
            keywords: keyword_query(topics),
            feed_urls: self.sources.feeds_for(topics),
        }
    }

    /// Merged article list for `topics`. Never fails; provider errors are
    /// logged and contribute nothing.
    pub async fn aggregate<S: AsRef<str>>(&self, topics: &[S]) -> Vec<UnifiedArticle> {
        self.aggregate_with_report(topics).await.articles
    }

    /// Like [`aggregate`](Self::aggregate), plus one status entry per adapter.
    pub async fn aggregate_with_report<S: AsRef<str>>(&self, topics: &[S]) -> AggregationReport {
        let query = self.build_query(topics);
        if query.keywords.is_empty() && query.feed_urls.is_empty() {
            tracing::debug!("no usable topics; skipping provider fan-out");
            return AggregationReport::default();
        }

        let query = &query;
        let results = join_all(self.adapters.iter().map(|adapter| {
            let since_hours = self.config.window_for(adapter.kind());
            async move { adapter.try_fetch(query, since_hours).await }
        }))
        .await;

        let mut batches = Vec::with_capacity(results.len());
        let mut providers = Vec::with_capacity(results.len());
        for (adapter, result) in self.adapters.iter().zip(results) {
            let status = match result {
                Ok(batch) => {
                    let status = ProviderStatus::Ok {
                        articles: batch.len(),
                    };
                    batches.push(batch);
                    status
                }
                Err(ProviderError::MissingApiKey { .. }) => {
                    tracing::debug!(provider = adapter.name(), "provider disabled: no API key");
                    ProviderStatus::Disabled
                }
                Err(e) => {
                    tracing::warn!(provider = adapter.name(), error = %e, "provider fetch failed");
                    ProviderStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            providers.push(ProviderReport {
                provider: adapter.name().to_string(),
                status,
            });
        }

        let report = AggregationReport {
            articles: merge_results(batches, &self.paywall),
            providers,
        };

        if report.all_providers_failed() {
            tracing::error!(
                providers = report.providers.len(),
                "every enabled provider failed"
            );
        } else {
            tracing::info!(
                articles = report.articles.len(),
                feeds = query.feed_urls.len(),
                "aggregation complete"
            );
        }

        report
    }
}

/// OR-combine quoted topics for keyword-search APIs: `"nba" OR "premier league"`.
///
/// Blank topics are skipped and embedded quotes removed.
#[must_use]
pub fn keyword_query<S: AsRef<str>>(topics: &[S]) -> String {
    topics
        .iter()
        .map(|t| t.as_ref().replace('"', ""))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Concatenate `batches` in order, keep the first article per dedup key,
/// flag paywalled URLs, and stable-sort newest first.
#[must_use]
pub fn merge_results(
    batches: Vec<Vec<UnifiedArticle>>,
    paywall: &PaywallList,
) -> Vec<UnifiedArticle> {
    let mut articles: Vec<UnifiedArticle> = batches.into_iter().flatten().collect();

    let mut seen = HashSet::new();
    articles.retain(|a| seen.insert(a.dedup_key()));

    for article in &mut articles {
        article.paywalled = paywall.is_paywalled(&article.url);
    }

    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;
