use async_trait::async_trait;
use tracing::warn;

use crate::errors::{SourceError, SourceResult};
use crate::utils::url::UrlUtils;

/// Result of a single retrieval attempt. Failures are values, never errors
/// raised to the caller.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(String),
    Unavailable(SourceError),
}

impl FetchOutcome {
    pub fn into_body(self) -> Option<String> {
        match self {
            FetchOutcome::Fetched(body) => Some(body),
            FetchOutcome::Unavailable(_) => None,
        }
    }
}

/// Retrieves the raw text of one playlist source
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    /// Fetch the body of `url`
    async fn fetch_text(&self, url: &str) -> SourceResult<String>;

    /// Single attempt, no retries. Any failure is logged and collapsed into
    /// [`FetchOutcome::Unavailable`].
    async fn fetch(&self, url: &str) -> FetchOutcome {
        match self.fetch_text(url).await {
            Ok(body) => FetchOutcome::Fetched(body),
            Err(e) => {
                warn!(
                    "Source unavailable, skipping {}: {}",
                    UrlUtils::obfuscate_credentials(url),
                    e
                );
                FetchOutcome::Unavailable(e)
            }
        }
    }
}
