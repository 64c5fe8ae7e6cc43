use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an article came from. Provenance only; never part of the dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Newsapi,
    Gnews,
    Rss,
    Cached,
}

impl SourceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Newsapi => "newsapi",
            SourceType::Gnews => "gnews",
            SourceType::Rss => "rss",
            SourceType::Cached => "cached",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newsapi" => Ok(SourceType::Newsapi),
            "gnews" => Ok(SourceType::Gnews),
            "rss" => Ok(SourceType::Rss),
            "cached" => Ok(SourceType::Cached),
            other => Err(format!("unknown source type: {other}")),
        }
    }
}

/// The normalized article every provider maps into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedArticle {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub source_type: SourceType,
    #[serde(rename = "urlToImage")]
    pub image_url: Option<String>,
    /// Set by the aggregator from the paywall list; upstream values are ignored.
    #[serde(default)]
    pub paywalled: bool,
}

impl UnifiedArticle {
    /// Key used to collapse duplicates within one aggregation pass.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        dedup_key(&self.url, &self.title)
    }
}

/// Identity of an article within one aggregation pass. URL and title keys
/// never compare equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Url(String),
    Title(String),
}

/// `url` when present, otherwise `title`.
#[must_use]
pub fn dedup_key(url: &str, title: &str) -> DedupKey {
    let url = url.trim();
    if url.is_empty() {
        DedupKey::Title(title.trim().to_string())
    } else {
        DedupKey::Url(url.to_string())
    }
}

/// Parse an upstream publish timestamp.
///
/// Accepts RFC 3339 (what the JSON APIs send) and RFC 2822 (common in feeds).
/// Anything missing or unparseable becomes the Unix epoch so the article sorts
/// last instead of failing its batch.
#[must_use]
pub fn parse_published_at(raw: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DateTime::<Utc>::UNIX_EPOCH;
    };

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map_or(DateTime::<Utc>::UNIX_EPOCH, |dt| dt.with_timezone(&Utc))
}
