//! HTTP playlist fetcher
//!
//! One GET per source per run, bounded by a total request timeout. The body is
//! decoded as UTF-8 regardless of what the server claims, with invalid
//! sequences replaced rather than rejected.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::traits::PlaylistFetcher;
use crate::config::FetchConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::utils::url::UrlUtils;

pub struct HttpPlaylistFetcher {
    client: Client,
}

impl HttpPlaylistFetcher {
    pub fn new(config: &FetchConfig) -> AppResult<Self> {
        Self::with_timeouts(
            config.timeout(),
            config.connect_timeout(),
            &config.user_agent,
        )
    }

    pub fn with_timeouts(
        timeout: Duration,
        connect_timeout: Duration,
        user_agent: &str,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

/// Decode a playlist body: lossy UTF-8, leading BOM removed
pub fn decode_body(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string()
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch_text(&self, url: &str) -> SourceResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        debug!("Fetching playlist from {}", safe_url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(safe_url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::http(safe_url, status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::from_reqwest(safe_url.as_str(), &e))?;

        if bytes.is_empty() {
            return Err(SourceError::EmptyBody { url: safe_url });
        }

        debug!("Fetched {} bytes from {}", bytes.len(), safe_url);
        Ok(decode_body(&bytes))
    }
}
