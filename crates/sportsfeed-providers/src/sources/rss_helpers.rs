//! Feed parsing and HTML stripping helpers for the RSS adapter.
//!
//! Everything here is pure so it can be tested against fixture XML without a
//! network round-trip.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Feed};
use regex::Regex;
use reqwest::Url;
use sportsfeed_core::{is_fresh, SourceType, UnifiedArticle};

use crate::error::ProviderError;

/// Parse a raw RSS/Atom body.
pub(crate) fn parse_feed(body: &[u8], feed_url: &str) -> Result<Feed, ProviderError> {
    feed_rs::parser::parse(body).map_err(|e| ProviderError::Feed {
        url: feed_url.to_string(),
        reason: e.to_string(),
    })
}

/// Map every usable entry of `feed` to a [`UnifiedArticle`].
///
/// Entries without a title or a date, and entries published before `cutoff`,
/// are dropped.
pub(crate) fn map_feed(feed: Feed, feed_url: &str, cutoff: DateTime<Utc>) -> Vec<UnifiedArticle> {
    let source = feed
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| feed_host(feed_url));

    feed.entries
        .into_iter()
        .filter_map(|entry| map_entry(entry, &source))
        .filter(|article| is_fresh(article, cutoff))
        .collect()
}

fn map_entry(entry: Entry, source: &str) -> Option<UnifiedArticle> {
    let title = entry
        .title
        .as_ref()
        .map(|t| strip_html(&t.content))
        .filter(|t| !t.is_empty())?;
    let published_at = entry.published.or(entry.updated)?;

    let description = entry
        .summary
        .as_ref()
        .map(|s| s.content.as_str())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.as_deref()))
        .map(strip_html)
        .filter(|d| !d.is_empty());

    let url = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default();

    Some(UnifiedArticle {
        title,
        description,
        url,
        source: source.to_string(),
        published_at,
        source_type: SourceType::Rss,
        image_url: entry_image(&entry),
        paywalled: false,
    })
}

/// First media thumbnail, falling back to the first media content URL.
fn entry_image(entry: &Entry) -> Option<String> {
    let thumbnail = entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| t.image.uri.trim())
        .find(|uri| !uri.is_empty());
    if let Some(uri) = thumbnail {
        return Some(uri.to_string());
    }

    entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| c.url.as_ref().map(ToString::to_string))
}

fn feed_host(feed_url: &str) -> String {
    Url::parse(feed_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| feed_url.to_string())
}

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").expect("valid tags regex"));

/// Strip HTML tags from a string and normalize whitespace.
pub(crate) fn strip_html(html: &str) -> String {
    TAGS.replace_all(html, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
