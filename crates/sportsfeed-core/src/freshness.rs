//! Lookback window and topic/search predicate shared by the live-fetch and
//! cache-read paths.
//!
//! Both paths must reach the same verdict for the same article, so the store's
//! SQL predicate is built from [`ArticleFilter`]'s normalized terms and uses the
//! same `published_at >= cutoff` comparison as [`is_fresh`].

use chrono::{DateTime, Duration, Utc};

use crate::article::UnifiedArticle;

pub const DEFAULT_HOURS_BACK: u32 = 24;
pub const MAX_HOURS_BACK: u32 = 720;
/// Lookback choices offered to clients.
pub const HOURS_BACK_CHOICES: [u32; 5] = [24, 36, 48, 72, 168];

/// A lookback period in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessWindow {
    hours_back: u32,
}

impl FreshnessWindow {
    /// Returns `None` unless `hours_back` is in `1..=MAX_HOURS_BACK`.
    #[must_use]
    pub fn new(hours_back: u32) -> Option<Self> {
        (1..=MAX_HOURS_BACK)
            .contains(&hours_back)
            .then_some(Self { hours_back })
    }

    #[must_use]
    pub fn hours_back(self) -> u32 {
        self.hours_back
    }

    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::hours(i64::from(self.hours_back))
    }

    /// Human-readable label, e.g. `last 24 hours` or `last 7 days`.
    #[must_use]
    pub fn describe(self) -> String {
        let hours = self.hours_back;
        if hours >= 48 && hours % 24 == 0 {
            format!("last {} days", hours / 24)
        } else if hours == 1 {
            "last 1 hour".to_string()
        } else {
            format!("last {hours} hours")
        }
    }
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self {
            hours_back: DEFAULT_HOURS_BACK,
        }
    }
}

/// An article is fresh when it was published at or after `cutoff`.
#[must_use]
pub fn is_fresh(article: &UnifiedArticle, cutoff: DateTime<Utc>) -> bool {
    article.published_at >= cutoff
}

/// Optional search/topic predicate applied on top of the freshness window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArticleFilter {
    #[default]
    All,
    /// Lowercased search text, matched against title and description.
    Search(String),
    /// Lowercased topic words, matched against title, description and url.
    Topics(Vec<String>),
}

impl ArticleFilter {
    /// Non-blank search text wins; otherwise every whitespace-delimited word of
    /// every topic becomes a match term.
    #[must_use]
    pub fn new(search: Option<&str>, topics: &[String]) -> Self {
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            return Self::Search(search.to_lowercase());
        }

        let mut words: Vec<String> = Vec::new();
        for word in topics.iter().flat_map(|t| t.split_whitespace()) {
            let word = word.to_lowercase();
            if !words.contains(&word) {
                words.push(word);
            }
        }

        if words.is_empty() {
            Self::All
        } else {
            Self::Topics(words)
        }
    }

    #[must_use]
    pub fn matches(&self, article: &UnifiedArticle) -> bool {
        match self {
            Self::All => true,
            Self::Search(text) => {
                contains_ci(&article.title, text)
                    || article
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_ci(d, text))
            }
            Self::Topics(words) => words.iter().any(|w| {
                contains_ci(&article.title, w)
                    || article
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_ci(d, w))
                    || contains_ci(&article.url, w)
            }),
        }
    }

    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        match self {
            Self::Search(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn topic_words(&self) -> &[String] {
        match self {
            Self::Topics(words) => words,
            _ => &[],
        }
    }
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
