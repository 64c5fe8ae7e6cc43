//! Curated RSS/Atom feed adapter.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::future::join_all;
use reqwest::Client;
use sportsfeed_core::UnifiedArticle;

use super::rss_helpers::{map_feed, parse_feed};
use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;
use crate::types::{AdapterKind, ProviderQuery};

const PROVIDER: &str = "rss";

/// Fetches every feed URL in the query concurrently.
///
/// One bad feed never hides the others; the adapter only errors when every
/// feed failed.
pub struct RssAdapter {
    client: Client,
}

impl RssAdapter {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_feed(
        &self,
        feed_url: &str,
        cutoff: chrono::DateTime<Utc>,
    ) -> Result<Vec<UnifiedArticle>, ProviderError> {
        let response = self.client.get(feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                provider: format!("{PROVIDER} {feed_url}"),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let feed = parse_feed(&body, feed_url)?;
        Ok(map_feed(feed, feed_url, cutoff))
    }
}

#[async_trait]
impl ProviderAdapter for RssAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Feed
    }

    async fn try_fetch(
        &self,
        query: &ProviderQuery,
        since_hours: u32,
    ) -> Result<Vec<UnifiedArticle>, ProviderError> {
        let mut seen = HashSet::new();
        let feed_urls: Vec<&str> = query
            .feed_urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty() && seen.insert(*u))
            .collect();
        if feed_urls.is_empty() {
            return Ok(Vec::new());
        }

        let cutoff = Utc::now() - Duration::hours(i64::from(since_hours));
        let results = join_all(feed_urls.iter().map(|url| self.fetch_feed(url, cutoff))).await;

        let mut articles = Vec::new();
        let mut failed = 0usize;
        for (url, result) in feed_urls.iter().zip(results) {
            match result {
                Ok(mut batch) => articles.append(&mut batch),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(feed = %url, error = %e, "feed fetch failed");
                }
            }
        }

        if failed == feed_urls.len() {
            return Err(ProviderError::AllFeedsFailed { count: failed });
        }

        tracing::debug!(
            provider = PROVIDER,
            feeds = feed_urls.len(),
            failed,
            count = articles.len(),
            "fetched feed entries"
        );
        Ok(articles)
    }
}
