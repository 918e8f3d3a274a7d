use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::Extractor;
use crate::fetch::HtmlFetcher;

/// Outcome of one scrape attempt. Consumed immediately by the caller and
/// never persisted. An extraction miss is `price: None` with no error; a
/// transport failure fills `error` and leaves both fields empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,
    pub price: Option<f64>,
    pub title: Option<String>,
    pub error: Option<String>,
}

impl ScrapeResult {
    fn failed(url: &str, message: String) -> Self {
        Self {
            url: url.to_string(),
            price: None,
            title: None,
            error: Some(message),
        }
    }
}

/// Composes the fetcher and the extractor into one best-effort
/// `fetch_price` call.
pub struct PriceScraper {
    fetcher: Arc<dyn HtmlFetcher>,
    extractor: Extractor,
}

impl PriceScraper {
    pub fn new(fetcher: Arc<dyn HtmlFetcher>) -> Self {
        Self {
            fetcher,
            extractor: Extractor::new(),
        }
    }

    pub async fn fetch_price(&self, url: &str) -> ScrapeResult {
        let domain = match url::Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => host.to_string(),
                None => return ScrapeResult::failed(url, "URL has no host".to_string()),
            },
            Err(e) => return ScrapeResult::failed(url, format!("invalid URL: {e}")),
        };

        let html = match self.fetcher.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => return ScrapeResult::failed(url, e.to_string()),
        };

        let (price, title) = self.extractor.extract(&html, &domain);
        debug!(url, ?price, ?title, "scrape completed");

        ScrapeResult {
            url: url.to_string(),
            price,
            title,
            error: None,
        }
    }
}
