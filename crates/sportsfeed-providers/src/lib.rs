//! News provider adapters and the aggregator that fans out over them.
//!
//! Keyword-search APIs (NewsAPI, GNews) and curated RSS feeds are queried
//! concurrently; results are merged, deduplicated by URL (title fallback),
//! flagged against the paywall list, and sorted newest first.

pub mod adapter;
pub mod aggregator;
pub mod error;
pub mod types;

mod sources;

pub use adapter::ProviderAdapter;
pub use aggregator::{keyword_query, merge_results, Aggregator};
pub use error::ProviderError;
pub use sources::{build_http_client, GNewsAdapter, NewsApiAdapter, RssAdapter};
pub use types::{
    AdapterKind, AggregationReport, AggregatorConfig, ProviderQuery, ProviderReport,
    ProviderStatus,
};
