//! On-demand ingestion: one aggregation pass, optionally written through to the cache.

use sportsfeed_core::{AppConfig, UnifiedArticle};
use sportsfeed_providers::{Aggregator, ProviderReport, ProviderStatus};

/// Run one aggregation pass for `topics` (or every configured topic when empty).
///
/// When `dry_run` is `true`, prints the merged articles and returns without
/// touching the database.
///
/// # Errors
///
/// Returns an error if the sources file cannot be loaded, no topics are
/// available, or the cache write fails. Provider failures are reported, not
/// returned.
pub(crate) async fn run_ingest(
    config: &AppConfig,
    topics: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let sources = sportsfeed_core::load_sources(&config.sources_path)?;
    let aggregator = Aggregator::from_app_config(config, sources)?;

    let topics = if topics.is_empty() {
        aggregator.default_topics()
    } else {
        topics.to_vec()
    };
    if topics.is_empty() {
        anyhow::bail!(
            "no topics to ingest; pass --topic or add topics to {}",
            config.sources_path.display()
        );
    }

    tracing::info!(topics = ?topics, dry_run, "starting ingestion");
    let report = aggregator.aggregate_with_report(&topics).await;

    println!("{:<12}STATUS", "PROVIDER");
    for provider in &report.providers {
        println!("{}", format_provider_line(provider));
    }

    if dry_run {
        println!();
        println!("[dry-run] {} article(s) would be cached:", report.articles.len());
        for article in &report.articles {
            println!("  {}", format_article_line(article));
        }
        return Ok(());
    }

    let pool = crate::connect(config).await?;
    let summary = sportsfeed_db::upsert_articles(&pool, &report.articles).await?;
    println!(
        "cached {} article(s), skipped {} without a url",
        summary.upserted, summary.skipped
    );

    if report.all_providers_failed() {
        anyhow::bail!("every enabled provider failed; see logs for details");
    }
    Ok(())
}

fn format_provider_line(report: &ProviderReport) -> String {
    let status = match &report.status {
        ProviderStatus::Ok { articles } => format!("ok ({articles} articles)"),
        ProviderStatus::Disabled => "disabled (no API key)".to_string(),
        ProviderStatus::Failed { error } => format!("failed: {error}"),
    };
    format!("{:<12}{status}", report.provider)
}

fn format_article_line(article: &UnifiedArticle) -> String {
    let paywall = if article.paywalled { " [paywall]" } else { "" };
    format!(
        "{} {:<8}{}{paywall}",
        article.published_at.format("%Y-%m-%d %H:%M"),
        article.source_type.as_str(),
        article.title
    )
}
