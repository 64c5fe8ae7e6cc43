//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring ingestion job that refreshes the article cache.

use std::sync::Arc;

use sportsfeed_providers::Aggregator;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// `ingest_cron` of `None` starts the scheduler with no jobs. The returned
/// handle must be kept alive for the lifetime of the process; dropping it
/// shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    aggregator: Arc<Aggregator>,
    ingest_cron: Option<&str>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match ingest_cron {
        Some(cron) => register_ingest_job(&scheduler, cron, pool, aggregator).await?,
        None => tracing::info!("scheduler: ingestion disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_ingest_job(
    scheduler: &JobScheduler,
    cron: &str,
    pool: PgPool,
    aggregator: Arc<Aggregator>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let aggregator = Arc::clone(&aggregator);

        Box::pin(async move {
            tracing::info!("scheduler: starting ingestion run");
            run_ingest_job(&pool, &aggregator).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: ingestion job registered");
    Ok(())
}

/// One aggregation pass over every configured topic, written through to the cache.
pub(crate) async fn run_ingest_job(pool: &PgPool, aggregator: &Aggregator) {
    let topics = aggregator.default_topics();
    if topics.is_empty() {
        tracing::warn!("scheduler: no topics configured; skipping ingestion");
        return;
    }

    let report = aggregator.aggregate_with_report(&topics).await;
    for provider in &report.providers {
        tracing::debug!(provider = %provider.provider, status = ?provider.status, "scheduler: provider status");
    }

    match sportsfeed_db::upsert_articles(pool, &report.articles).await {
        Ok(summary) => tracing::info!(
            topics = topics.len(),
            upserted = summary.upserted,
            skipped = summary.skipped,
            "scheduler: ingestion run complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: failed to write articles to cache"),
    }
}
