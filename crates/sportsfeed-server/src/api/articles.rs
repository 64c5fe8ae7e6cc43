use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sportsfeed_core::{
    ArticleFilter, FreshnessWindow, UnifiedArticle, HOURS_BACK_CHOICES, MAX_HOURS_BACK,
};
use sportsfeed_db::CachedArticle;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CachedArticleItem {
    #[serde(flatten)]
    article: UnifiedArticle,
    cached_at: DateTime<Utc>,
    last_fetched: DateTime<Utc>,
}

impl From<CachedArticle> for CachedArticleItem {
    fn from(row: CachedArticle) -> Self {
        let cached_at = row.cached_at;
        let last_fetched = row.last_fetched;
        Self {
            article: row.into_unified(),
            cached_at,
            last_fetched,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ArticlesResponse {
    articles: Vec<CachedArticleItem>,
    total_results: i64,
    from_cache: bool,
    time_range: String,
}

/// Numeric parameters stay raw strings so a bad value becomes our own 400 body
/// instead of the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ArticlesQuery {
    pub topics: Option<String>,
    pub search_query: Option<String>,
    pub hours_back: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    pub hours_back: Option<String>,
    pub limit: Option<String>,
}

pub(super) async fn list_articles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let window = parse_window(query.hours_back.as_deref(), state.default_window)?;
    let limit = parse_limit(query.limit.as_deref())?;
    let topics = split_topics(query.topics.as_deref());
    let filter = ArticleFilter::new(query.search_query.as_deref(), &topics);

    load_articles(&state, &req_id, window, &filter, limit).await
}

pub(super) async fn search_articles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Err(ApiError::bad_request("query parameter 'q' is required"));
    };
    let window = parse_window(query.hours_back.as_deref(), state.default_window)?;
    let limit = parse_limit(query.limit.as_deref())?;
    let filter = ArticleFilter::new(Some(q), &[]);

    load_articles(&state, &req_id, window, &filter, limit).await
}

async fn load_articles(
    state: &AppState,
    req_id: &RequestId,
    window: FreshnessWindow,
    filter: &ArticleFilter,
    limit: Option<i64>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let cutoff = window.cutoff(Utc::now());
    let page = sportsfeed_db::query_articles(&state.pool, cutoff, filter, limit)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;

    let articles: Vec<CachedArticleItem> = page.articles.into_iter().map(Into::into).collect();
    tracing::debug!(
        request_id = %req_id.0,
        hours_back = window.hours_back(),
        count = articles.len(),
        total = page.total,
        "served cached articles"
    );

    Ok(Json(ArticlesResponse {
        total_results: page.total,
        articles,
        from_cache: true,
        time_range: window.describe(),
    }))
}

pub(super) fn parse_window(
    raw: Option<&str>,
    default: FreshnessWindow,
) -> Result<FreshnessWindow, ApiError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    raw.trim()
        .parse::<u32>()
        .ok()
        .and_then(FreshnessWindow::new)
        .ok_or_else(|| {
            let choices: Vec<String> = HOURS_BACK_CHOICES.iter().map(ToString::to_string).collect();
            ApiError::bad_request(format!(
                "hoursBack must be an integer between 1 and {MAX_HOURS_BACK} (common choices: {})",
                choices.join(", ")
            ))
        })
}

/// Absent means every matching article; otherwise a positive integer.
pub(super) fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|limit| *limit >= 1)
        .map(Some)
        .ok_or_else(|| ApiError::bad_request("limit must be a positive integer"))
}

pub(super) fn split_topics(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}
