use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    #[error("unexpected HTTP status {status} from {provider}")]
    UnexpectedStatus { provider: String, status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} response has no articles field")]
    MissingArticles { provider: &'static str },

    #[error("feed parse error for {url}: {reason}")]
    Feed { url: String, reason: String },

    #[error("all {count} feeds failed")]
    AllFeedsFailed { count: usize },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
