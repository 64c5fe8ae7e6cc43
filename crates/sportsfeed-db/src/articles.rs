//! Database operations for the `articles` cache.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sportsfeed_core::{ArticleFilter, SourceType, UnifiedArticle};

use crate::DbError;

/// Upper bound applied when a caller asks for a limit.
pub const MAX_QUERY_LIMIT: i64 = 500;

/// A row from the `articles` table.
///
/// `provider` records which adapter produced the article; reads always report
/// `sourceType: cached` and keep the provider as provenance only.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CachedArticle {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub source: String,
    pub provider: String,
    pub image_url: Option<String>,
    pub paywalled: bool,
    pub published_at: DateTime<Utc>,
    pub cached_at: DateTime<Utc>,
    pub last_fetched: DateTime<Utc>,
}

impl CachedArticle {
    #[must_use]
    pub fn into_unified(self) -> UnifiedArticle {
        UnifiedArticle {
            title: self.title,
            description: self.description,
            url: self.url,
            source: self.source,
            published_at: self.published_at,
            source_type: SourceType::Cached,
            image_url: self.image_url,
            paywalled: self.paywalled,
        }
    }
}

/// Articles returned by [`query_articles`] together with the number of rows
/// that matched before any limit was applied.
#[derive(Debug, Clone, Default)]
pub struct ArticlePage {
    pub articles: Vec<CachedArticle>,
    pub total: i64,
}

#[derive(sqlx::FromRow)]
struct CountedArticle {
    #[sqlx(flatten)]
    article: CachedArticle,
    total_count: i64,
}

/// Outcome of one write-through batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    /// Rows inserted or refreshed.
    pub upserted: usize,
    /// Articles without a URL, which cannot be keyed.
    pub skipped: usize,
}

/// Write `articles` through to the cache in one transaction.
///
/// Conflicts on `url` refresh the content columns and `last_fetched` while
/// `cached_at` keeps the first-seen time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; nothing is committed then.
pub async fn upsert_articles(
    pool: &PgPool,
    articles: &[UnifiedArticle],
) -> Result<UpsertSummary, DbError> {
    let mut summary = UpsertSummary::default();
    let mut tx = pool.begin().await?;

    for article in articles {
        let url = article.url.trim();
        if url.is_empty() {
            summary.skipped += 1;
            continue;
        }

        sqlx::query(
            "INSERT INTO articles \
                 (url, title, description, source, provider, image_url, paywalled, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (url) DO UPDATE SET \
                 title        = EXCLUDED.title, \
                 description  = EXCLUDED.description, \
                 source       = EXCLUDED.source, \
                 provider     = EXCLUDED.provider, \
                 image_url    = EXCLUDED.image_url, \
                 paywalled    = EXCLUDED.paywalled, \
                 published_at = EXCLUDED.published_at, \
                 last_fetched = NOW()",
        )
        .bind(url)
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.source)
        .bind(article.source_type.as_str())
        .bind(&article.image_url)
        .bind(article.paywalled)
        .bind(article.published_at)
        .execute(&mut *tx)
        .await?;

        summary.upserted += 1;
    }

    tx.commit().await?;
    Ok(summary)
}

/// Cached articles published at or after `cutoff` that match `filter`,
/// newest first.
///
/// `None` returns every matching row. An explicit `limit` is clamped to
/// `1..=MAX_QUERY_LIMIT`. [`ArticlePage::total`] always counts every match.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn query_articles(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
    filter: &ArticleFilter,
    limit: Option<i64>,
) -> Result<ArticlePage, DbError> {
    let limit = limit.map(|l| l.clamp(1, MAX_QUERY_LIMIT));
    let search = filter.search_text().map(contains_pattern);
    let topic_patterns: Option<Vec<String>> = match filter.topic_words() {
        [] => None,
        words => Some(words.iter().map(|w| contains_pattern(w)).collect()),
    };

    // LIMIT NULL means no limit; the window count is taken before LIMIT.
    let rows = sqlx::query_as::<_, CountedArticle>(
        "SELECT \
             id, url, title, description, source, provider, image_url, \
             paywalled, published_at, cached_at, last_fetched, \
             COUNT(*) OVER () AS total_count \
         FROM articles \
         WHERE published_at >= $1 \
           AND ($2::TEXT IS NULL OR title ILIKE $2 OR description ILIKE $2) \
           AND ($3::TEXT[] IS NULL OR EXISTS ( \
                 SELECT 1 FROM unnest($3::TEXT[]) AS pattern \
                 WHERE title ILIKE pattern \
                    OR description ILIKE pattern \
                    OR url ILIKE pattern)) \
         ORDER BY published_at DESC, id DESC \
         LIMIT $4",
    )
    .bind(cutoff)
    .bind(search)
    .bind(topic_patterns)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let total = rows.first().map_or(0, |r| r.total_count);
    Ok(ArticlePage {
        articles: rows.into_iter().map(|r| r.article).collect(),
        total,
    })
}

/// `%term%` with `ILIKE` wildcards in `term` escaped so it matches literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
