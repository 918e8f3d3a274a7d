use std::time::Duration;

use async_trait::async_trait;

use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result};

/// Abstract page retrieval. The checker and the addition workflow only need
/// "give me this URL's HTML"; tests swap in stub implementations.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher with a desktop-browser identity and a bounded timeout.
///
/// Every transport failure (DNS, TLS, timeout, non-2xx status) surfaces as a
/// single `Network` error. No retries happen here; retry policy belongs to
/// callers, and neither the checker nor the workflow retries within a check.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HtmlFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status().map_err(|e| AppError::Network {
            message: e.to_string(),
        })?;
        let body = response.text().await?;
        Ok(body)
    }
}
