use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::paywall::{PaywallList, DEFAULT_PAYWALLED_DOMAINS};
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    #[serde(default)]
    pub feeds: Vec<String>,
}

/// Contents of the sources YAML file: topic → feed mapping plus the paywall list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesFile {
    #[serde(default = "default_paywalled_domains")]
    pub paywalled_domains: Vec<String>,
    #[serde(default)]
    pub topics: Vec<TopicConfig>,
}

fn default_paywalled_domains() -> Vec<String> {
    DEFAULT_PAYWALLED_DOMAINS
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for SourcesFile {
    fn default() -> Self {
        Self {
            paywalled_domains: default_paywalled_domains(),
            topics: Vec::new(),
        }
    }
}

impl SourcesFile {
    #[must_use]
    pub fn paywall_list(&self) -> PaywallList {
        PaywallList::new(&self.paywalled_domains)
    }

    /// Names of all configured topics, in file order.
    #[must_use]
    pub fn topic_names(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.name.clone()).collect()
    }

    /// Union of the feeds configured for `topics`, duplicates removed.
    ///
    /// Topic lookup ignores case. Unknown topics contribute no feeds.
    #[must_use]
    pub fn feeds_for<S: AsRef<str>>(&self, topics: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut feeds = Vec::new();

        for requested in topics {
            let requested = topic_key(requested.as_ref());
            let Some(topic) = self
                .topics
                .iter()
                .find(|t| topic_key(&t.name) == requested)
            else {
                continue;
            };
            for feed in &topic.feeds {
                let feed = feed.trim();
                if seen.insert(feed.to_string()) {
                    feeds.push(feed.to_string());
                }
            }
        }

        feeds
    }
}

/// Load and validate the sources configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

/// Parse and validate sources YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let sources: SourcesFile = serde_yaml::from_str(content)?;
    validate_sources(&sources)?;
    Ok(sources)
}

/// Normalised topic name used for both lookup and duplicate detection.
fn topic_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_sources(sources: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for topic in &sources.topics {
        if topic.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "topic name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(topic_key(&topic.name)) {
            return Err(ConfigError::Validation(format!(
                "duplicate topic name: '{}'",
                topic.name
            )));
        }

        for feed in &topic.feeds {
            let feed = feed.trim();
            if !(feed.starts_with("http://") || feed.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "topic '{}' has invalid feed URL '{feed}'; must be http(s)",
                    topic.name
                )));
            }
        }
    }

    if sources.paywalled_domains.iter().any(|d| d.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "paywalled domain entries must be non-empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
