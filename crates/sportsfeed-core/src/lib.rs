//! Shared domain types and configuration for sportsfeed.

pub mod app_config;
pub mod article;
pub mod config;
pub mod freshness;
pub mod paywall;
pub mod sources;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use article::{dedup_key, parse_published_at, DedupKey, SourceType, UnifiedArticle};
pub use config::{load_app_config, load_app_config_from_env};
pub use freshness::{
    is_fresh, ArticleFilter, FreshnessWindow, DEFAULT_HOURS_BACK, HOURS_BACK_CHOICES,
    MAX_HOURS_BACK,
};
pub use paywall::PaywallList;
pub use sources::{load_sources, SourcesFile, TopicConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation error: {0}")]
    Validation(String),
}
