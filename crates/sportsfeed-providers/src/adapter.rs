use async_trait::async_trait;
use sportsfeed_core::UnifiedArticle;

use crate::error::ProviderError;
use crate::types::{AdapterKind, ProviderQuery};

/// One upstream news source.
///
/// Implementations do network I/O only; they never touch shared state.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider name used in logs and reports.
    fn name(&self) -> &str;

    fn kind(&self) -> AdapterKind;

    /// Fetch articles published within the last `since_hours`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network, status, or payload failures, and
    /// [`ProviderError::MissingApiKey`] without any I/O when the provider is
    /// not configured.
    async fn try_fetch(
        &self,
        query: &ProviderQuery,
        since_hours: u32,
    ) -> Result<Vec<UnifiedArticle>, ProviderError>;

    /// Infallible form of [`try_fetch`](Self::try_fetch): failures are logged
    /// and become an empty list.
    async fn fetch(&self, query: &ProviderQuery, since_hours: u32) -> Vec<UnifiedArticle> {
        match self.try_fetch(query, since_hours).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(provider = self.name(), error = %e, "provider fetch failed");
                Vec::new()
            }
        }
    }
}
