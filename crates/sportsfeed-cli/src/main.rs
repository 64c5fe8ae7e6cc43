mod articles;
mod ingest;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sportsfeed-cli")]
#[command(about = "Sports news aggregator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch articles from every provider and write them to the cache
    Ingest {
        /// Topic to fetch (repeatable); defaults to every topic in the sources file
        #[arg(long = "topic")]
        topics: Vec<String>,
        /// Print what would be cached without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// List cached articles inside a lookback window
    Articles {
        /// Topic filter (repeatable)
        #[arg(long = "topic")]
        topics: Vec<String>,
        /// Free-text search over title and description; overrides topics
        #[arg(long)]
        search: Option<String>,
        /// Lookback window in hours (1-720); defaults to `SPORTSFEED_HOURS_BACK`
        #[arg(long)]
        hours_back: Option<u32>,
        /// Maximum number of articles to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("sportsfeed-cli: run with --help to list commands");
        return Ok(());
    };

    let config = sportsfeed_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Ingest { topics, dry_run } => {
            ingest::run_ingest(&config, &topics, dry_run).await?;
        }
        Commands::Articles {
            topics,
            search,
            hours_back,
            limit,
        } => {
            let pool = connect(&config).await?;
            articles::run_articles(
                &pool,
                &articles::ArticlesArgs {
                    topics,
                    search,
                    hours_back: hours_back.unwrap_or(config.hours_back),
                    limit,
                },
            )
            .await?;
        }
        Commands::Migrate => {
            let pool = connect(&config).await?;
            let applied = sportsfeed_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }

    Ok(())
}

pub(crate) async fn connect(config: &sportsfeed_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = sportsfeed_db::PoolConfig::from_app_config(config);
    let pool = sportsfeed_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
