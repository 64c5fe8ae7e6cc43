use serde::Serialize;
use sportsfeed_core::UnifiedArticle;

/// What an adapter is asked for during one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderQuery {
    /// OR-combined quoted topics for keyword-search APIs. Empty means "nothing to search".
    pub keywords: String,
    /// Feed URLs for the RSS adapter, already deduplicated.
    pub feed_urls: Vec<String>,
}

/// Adapter family. Keyword-search adapters always merge ahead of feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    KeywordSearch,
    Feed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProviderStatus {
    Ok { articles: usize },
    /// No API key configured; no request was made.
    Disabled,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderReport {
    pub provider: String,
    pub status: ProviderStatus,
}

/// Merged article list plus per-provider health for one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct AggregationReport {
    pub articles: Vec<UnifiedArticle>,
    pub providers: Vec<ProviderReport>,
}

impl AggregationReport {
    /// True when at least one provider was attempted and every attempted one failed.
    #[must_use]
    pub fn all_providers_failed(&self) -> bool {
        let mut attempted = self
            .providers
            .iter()
            .filter(|p| p.status != ProviderStatus::Disabled)
            .peekable();
        attempted.peek().is_some()
            && attempted.all(|p| matches!(p.status, ProviderStatus::Failed { .. }))
    }
}

/// Aggregator tuning passed in at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Lookback sent to keyword-search adapters.
    pub keyword_window_hours: u32,
    /// Lookback applied to feed entries.
    pub feed_window_hours: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            keyword_window_hours: 24,
            feed_window_hours: 168,
        }
    }
}

impl AggregatorConfig {
    #[must_use]
    pub fn window_for(self, kind: AdapterKind) -> u32 {
        match kind {
            AdapterKind::KeywordSearch => self.keyword_window_hours,
            AdapterKind::Feed => self.feed_window_hours,
        }
    }
}
