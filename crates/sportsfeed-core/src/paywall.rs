/// Domains treated as paywalled when no list is configured.
pub const DEFAULT_PAYWALLED_DOMAINS: &[&str] = &[
    "nytimes.com",
    "theathletic.com",
    "wsj.com",
    "washingtonpost.com",
    "bloomberg.com",
    "ft.com",
    "latimes.com",
    "bostonglobe.com",
    "si.com/vault",
    "economist.com",
];

/// Static deny-list of paywalled domains.
///
/// Matching is a case-insensitive substring test against the article URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaywallList {
    domains: Vec<String>,
}

impl PaywallList {
    #[must_use]
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    #[must_use]
    pub fn is_paywalled(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }
        let url = url.to_lowercase();
        self.domains.iter().any(|d| url.contains(d.as_str()))
    }

    #[must_use]
    pub fn domains(&self) -> &[String] {
        &self.domains
    }
}

impl Default for PaywallList {
    fn default() -> Self {
        Self::new(DEFAULT_PAYWALLED_DOMAINS)
    }
}
