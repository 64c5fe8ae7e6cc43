//! Read-only cache query handler.

use chrono::Utc;
use sportsfeed_core::{ArticleFilter, FreshnessWindow, MAX_HOURS_BACK};

const TITLE_WIDTH: usize = 70;

#[derive(Debug)]
pub(crate) struct ArticlesArgs {
    pub topics: Vec<String>,
    pub search: Option<String>,
    pub hours_back: u32,
    pub limit: i64,
}

/// Print cached articles inside the lookback window, newest first.
///
/// # Errors
///
/// Returns an error if `hours_back` is out of range or the query fails.
pub(crate) async fn run_articles(pool: &sqlx::PgPool, args: &ArticlesArgs) -> anyhow::Result<()> {
    let window = FreshnessWindow::new(args.hours_back).ok_or_else(|| {
        anyhow::anyhow!("--hours-back must be between 1 and {MAX_HOURS_BACK}")
    })?;
    let filter = ArticleFilter::new(args.search.as_deref(), &args.topics);

    let page = sportsfeed_db::query_articles(
        pool,
        window.cutoff(Utc::now()),
        &filter,
        Some(args.limit),
    )
    .await?;

    if page.articles.is_empty() {
        println!(
            "no cached articles in the {}; run `ingest` first",
            window.describe()
        );
        return Ok(());
    }

    println!(
        "{:<18}{:<22}{:<9}TITLE",
        "PUBLISHED", "SOURCE", "PAYWALL"
    );
    for row in &page.articles {
        println!(
            "{:<18}{:<22}{:<9}{}",
            row.published_at.format("%Y-%m-%d %H:%M").to_string(),
            truncate(&row.source, 20),
            if row.paywalled { "yes" } else { "" },
            truncate(&row.title, TITLE_WIDTH)
        );
    }
    println!(
        "showing {} of {} article(s), {}",
        page.articles.len(),
        page.total,
        window.describe()
    );

    Ok(())
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}
