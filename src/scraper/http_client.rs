use crate::config::HttpConfig;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

use super::ExtractionFault;

/// Shared HTTP client. Cloning is cheap; the connection pool is reference counted.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { inner })
    }

    /// Fetch a URL as text. One attempt; any non-2xx status is a fault.
    pub async fn get_text(&self, url: &str) -> Result<String, ExtractionFault> {
        debug!("GET {}", url);

        let resp = self.inner.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExtractionFault::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp.text().await?)
    }
}
