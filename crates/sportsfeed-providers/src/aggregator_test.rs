use super::*;

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sportsfeed_core::{SourceType, TopicConfig};

use crate::types::AdapterKind;

enum Outcome {
    Articles(Vec<UnifiedArticle>),
    Status(u16),
    NoKey,
}

struct StubAdapter {
    name: &'static str,
    kind: AdapterKind,
    outcome: Outcome,
    delay: StdDuration,
    calls: AtomicUsize,
    last_since_hours: AtomicU32,
}

impl StubAdapter {
    fn new(name: &'static str, kind: AdapterKind, outcome: Outcome) -> Self {
        Self {
            name,
            kind,
            outcome,
            delay: StdDuration::ZERO,
            calls: AtomicUsize::new(0),
            last_since_hours: AtomicU32::new(0),
        }
    }

    fn delayed(mut self, delay: StdDuration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ProviderAdapter for StubAdapter {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> AdapterKind {
        self.kind
    }

    async fn try_fetch(
        &self,
        _query: &ProviderQuery,
        since_hours: u32,
    ) -> Result<Vec<UnifiedArticle>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_since_hours.store(since_hours, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            Outcome::Articles(articles) => Ok(articles.clone()),
            Outcome::Status(status) => Err(ProviderError::UnexpectedStatus {
                provider: self.name.to_string(),
                status: *status,
            }),
            Outcome::NoKey => Err(ProviderError::MissingApiKey { provider: "stub" }),
        }
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn article(title: &str, url: &str, hours_ago: i64, source_type: SourceType) -> UnifiedArticle {
    UnifiedArticle {
        title: title.to_string(),
        description: None,
        url: url.to_string(),
        source: "Test".to_string(),
        published_at: now() - Duration::hours(hours_ago),
        source_type,
        image_url: None,
        paywalled: false,
    }
}

fn sources() -> SourcesFile {
    SourcesFile {
        topics: vec![
            TopicConfig {
                name: "nba".to_string(),
                feeds: vec![
                    "https://www.espn.com/espn/rss/nba/news".to_string(),
                    "https://www.cbssports.com/rss/headlines/nba/".to_string(),
                ],
            },
            TopicConfig {
                name: "golden state warriors".to_string(),
                feeds: vec!["https://www.espn.com/espn/rss/nba/news".to_string()],
            },
        ],
        ..SourcesFile::default()
    }
}

#[test]
fn keyword_query_quotes_and_or_combines() {
    let topics = ["nba", "  ", "premier league"];
    assert_eq!(keyword_query(&topics), "\"nba\" OR \"premier league\"");
}

#[test]
fn keyword_query_strips_embedded_quotes() {
    assert_eq!(keyword_query(&["\"nfl\""]), "\"nfl\"");
    assert_eq!(keyword_query::<&str>(&[]), "");
}

#[test]
fn build_query_unions_feeds_without_duplicates() {
    let aggregator = Aggregator::new(sources(), AggregatorConfig::default());
    let query = aggregator.build_query(&["NBA", "Golden State Warriors"]);
    assert_eq!(
        query.feed_urls,
        vec![
            "https://www.espn.com/espn/rss/nba/news".to_string(),
            "https://www.cbssports.com/rss/headlines/nba/".to_string(),
        ]
    );
    assert_eq!(query.keywords, "\"NBA\" OR \"Golden State Warriors\"");
}

#[test]
fn merge_keeps_first_occurrence_per_url() {
    let batches = vec![
        vec![article("From NewsAPI", "https://x.com/a", 1, SourceType::Newsapi)],
        vec![article("From GNews", "https://x.com/a", 1, SourceType::Gnews)],
    ];
    let merged = merge_results(batches, &PaywallList::default());
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].title, "From NewsAPI");
    assert_eq!(merged[0].source_type, SourceType::Newsapi);
}

#[test]
fn merge_dedups_blank_urls_by_title() {
    let batches = vec![vec![
        article("Same headline", "", 1, SourceType::Rss),
        article("Same headline", "  ", 2, SourceType::Rss),
        article("Other headline", "", 3, SourceType::Rss),
    ]];
    let merged = merge_results(batches, &PaywallList::default());
    let titles: Vec<&str> = merged.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Same headline", "Other headline"]);
}

#[test]
fn merge_keeps_url_less_article_titled_like_another_url() {
    let batches = vec![vec![
        article("Recap", "https://x.com/a", 1, SourceType::Newsapi),
        article("https://x.com/a", "", 2, SourceType::Rss),
    ]];
    let merged = merge_results(batches, &PaywallList::default());
    assert_eq!(merged.len(), 2);
}

#[test]
fn merge_flags_paywalled_urls() {
    let mut free = article("Free", "https://espn.com/1", 1, SourceType::Rss);
    free.paywalled = true;
    let batches = vec![vec![
        article("Paid", "https://www.NYTimes.com/sports/1", 2, SourceType::Newsapi),
        free,
    ]];
    let merged = merge_results(batches, &PaywallList::default());
    let paid = merged.iter().find(|a| a.title == "Paid").unwrap();
    let free = merged.iter().find(|a| a.title == "Free").unwrap();
    assert!(paid.paywalled);
    assert!(!free.paywalled, "upstream paywall flag must be recomputed");
}

#[test]
fn merge_sorts_newest_first_and_keeps_ties_stable() {
    let batches = vec![
        vec![
            article("old", "https://x.com/old", 10, SourceType::Newsapi),
            article("tie-a", "https://x.com/tie-a", 2, SourceType::Newsapi),
        ],
        vec![
            article("new", "https://x.com/new", 1, SourceType::Rss),
            article("tie-b", "https://x.com/tie-b", 2, SourceType::Rss),
        ],
    ];
    let merged = merge_results(batches, &PaywallList::default());
    let titles: Vec<&str> = merged.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["new", "tie-a", "tie-b", "old"]);
}

#[test]
fn with_adapter_orders_keyword_search_before_feeds() {
    let aggregator = Aggregator::new(sources(), AggregatorConfig::default())
        .with_adapter(Arc::new(StubAdapter::new(
            "rss",
            AdapterKind::Feed,
            Outcome::Articles(vec![]),
        )))
        .with_adapter(Arc::new(StubAdapter::new(
            "newsapi",
            AdapterKind::KeywordSearch,
            Outcome::Articles(vec![]),
        )))
        .with_adapter(Arc::new(StubAdapter::new(
            "gnews",
            AdapterKind::KeywordSearch,
            Outcome::Articles(vec![]),
        )));
    assert_eq!(aggregator.provider_names(), vec!["newsapi", "gnews", "rss"]);
}

#[tokio::test]
async fn empty_topics_skip_every_provider() {
    let stub = Arc::new(StubAdapter::new(
        "newsapi",
        AdapterKind::KeywordSearch,
        Outcome::Articles(vec![article("x", "https://x.com", 1, SourceType::Newsapi)]),
    ));
    let aggregator =
        Aggregator::new(sources(), AggregatorConfig::default()).with_adapter(stub.clone());

    let report = aggregator.aggregate_with_report::<&str>(&[]).await;
    assert!(report.articles.is_empty());
    assert!(report.providers.is_empty());
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_provider_does_not_hide_the_others() {
    let aggregator = Aggregator::new(sources(), AggregatorConfig::default())
        .with_adapter(Arc::new(StubAdapter::new(
            "newsapi",
            AdapterKind::KeywordSearch,
            Outcome::Status(500),
        )))
        .with_adapter(Arc::new(StubAdapter::new(
            "gnews",
            AdapterKind::KeywordSearch,
            Outcome::NoKey,
        )))
        .with_adapter(Arc::new(StubAdapter::new(
            "rss",
            AdapterKind::Feed,
            Outcome::Articles(vec![article(
                "Warriors win",
                "https://espn.com/w",
                1,
                SourceType::Rss,
            )]),
        )));

    let report = aggregator.aggregate_with_report(&["nba"]).await;
    assert_eq!(report.articles.len(), 1);
    assert_eq!(report.articles[0].title, "Warriors win");
    assert!(!report.all_providers_failed());

    let statuses: Vec<(&str, &ProviderStatus)> = report
        .providers
        .iter()
        .map(|p| (p.provider.as_str(), &p.status))
        .collect();
    assert!(matches!(statuses[0], ("newsapi", ProviderStatus::Failed { .. })));
    assert_eq!(statuses[1], ("gnews", &ProviderStatus::Disabled));
    assert_eq!(statuses[2], ("rss", &ProviderStatus::Ok { articles: 1 }));
}

#[tokio::test]
async fn all_providers_failing_is_reported() {
    let aggregator = Aggregator::new(sources(), AggregatorConfig::default())
        .with_adapter(Arc::new(StubAdapter::new(
            "newsapi",
            AdapterKind::KeywordSearch,
            Outcome::Status(429),
        )))
        .with_adapter(Arc::new(StubAdapter::new(
            "rss",
            AdapterKind::Feed,
            Outcome::Status(503),
        )));

    let report = aggregator.aggregate_with_report(&["nba"]).await;
    assert!(report.articles.is_empty());
    assert!(report.all_providers_failed());
}

#[tokio::test]
async fn adapters_receive_their_kind_window() {
    let keyword = Arc::new(StubAdapter::new(
        "newsapi",
        AdapterKind::KeywordSearch,
        Outcome::Articles(vec![]),
    ));
    let feed = Arc::new(StubAdapter::new("rss", AdapterKind::Feed, Outcome::Articles(vec![])));
    let config = AggregatorConfig {
        keyword_window_hours: 12,
        feed_window_hours: 48,
    };
    let aggregator = Aggregator::new(sources(), config)
        .with_adapter(keyword.clone())
        .with_adapter(feed.clone());

    aggregator.aggregate(&["nba"]).await;
    assert_eq!(keyword.last_since_hours.load(Ordering::SeqCst), 12);
    assert_eq!(feed.last_since_hours.load(Ordering::SeqCst), 48);
}

#[tokio::test]
async fn merged_order_follows_registration_not_completion() {
    let aggregator = Aggregator::new(sources(), AggregatorConfig::default())
        .with_adapter(Arc::new(
            StubAdapter::new(
                "newsapi",
                AdapterKind::KeywordSearch,
                Outcome::Articles(vec![article("slow", "https://x.com/same", 1, SourceType::Newsapi)]),
            )
            .delayed(StdDuration::from_millis(50)),
        ))
        .with_adapter(Arc::new(StubAdapter::new(
            "rss",
            AdapterKind::Feed,
            Outcome::Articles(vec![article("fast", "https://x.com/same", 1, SourceType::Rss)]),
        )));

    let articles = aggregator.aggregate(&["nba"]).await;
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "slow");
}

#[tokio::test(start_paused = true)]
async fn latency_is_bounded_by_the_slowest_adapter() {
    let aggregator = Aggregator::new(sources(), AggregatorConfig::default())
        .with_adapter(Arc::new(
            StubAdapter::new("a", AdapterKind::KeywordSearch, Outcome::Articles(vec![]))
                .delayed(StdDuration::from_millis(100)),
        ))
        .with_adapter(Arc::new(
            StubAdapter::new("b", AdapterKind::KeywordSearch, Outcome::Articles(vec![]))
                .delayed(StdDuration::from_millis(200)),
        ))
        .with_adapter(Arc::new(
            StubAdapter::new("c", AdapterKind::Feed, Outcome::Articles(vec![]))
                .delayed(StdDuration::from_millis(300)),
        ));

    let start = tokio::time::Instant::now();
    aggregator.aggregate(&["nba"]).await;
    let elapsed = start.elapsed();

    assert!(elapsed >= StdDuration::from_millis(300));
    assert!(elapsed < StdDuration::from_millis(400), "took {elapsed:?}");
}
