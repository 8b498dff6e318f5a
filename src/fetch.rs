// src/fetch.rs
//! Page fetching. One GET per URL, no retries; any failure collapses to `None`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use rand::Rng;
use reqwest::StatusCode;
use tracing::{debug, warn};

/// Browser-like agent; several sources refuse obvious bot agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Politeness delay bounds (seconds) applied before every request.
const DELAY_MIN_SECS: f64 = 1.0;
const DELAY_MAX_SECS: f64 = 3.0;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw markup of `url`, or `None` on any failure.
    async fn fetch(&self, url: &str) -> Option<String>;
    fn name(&self) -> &'static str;
}

/// Live fetcher backed by `reqwest`.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    fn politeness_delay() -> Duration {
        let secs = rand::rng().random_range(DELAY_MIN_SECS..=DELAY_MAX_SECS);
        Duration::from_secs_f64(secs)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        let delay = Self::politeness_delay();
        debug!(url, delay_ms = delay.as_millis() as u64, "waiting before fetch");
        tokio::time::sleep(delay).await;

        let resp = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url, error = %e, "error fetching url");
                counter!("fetch_errors_total", "kind" => "transport").increment(1);
                return None;
            }
        };

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(url, status = status.as_u16(), "failed to retrieve page");
            counter!("fetch_errors_total", "kind" => "status").increment(1);
            return None;
        }

        match resp.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(url, error = %e, "error reading response body");
                counter!("fetch_errors_total", "kind" => "body").increment(1);
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Offline fetcher serving fixed bodies by URL; unknown URLs fail.
#[derive(Debug, Default, Clone)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        self.pages.get(url).cloned()
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn politeness_delay_stays_in_bounds() {
        for _ in 0..200 {
            let d = HttpFetcher::politeness_delay();
            assert!(d >= Duration::from_secs(1) && d <= Duration::from_secs(3), "{d:?}");
        }
    }

    #[tokio::test]
    async fn fixture_fetcher_serves_known_urls_only() {
        let f = FixtureFetcher::new().with_page("https://a.test/", "<p>hi</p>");
        assert_eq!(f.fetch("https://a.test/").await.as_deref(), Some("<p>hi</p>"));
        assert!(f.fetch("https://b.test/").await.is_none());
    }
}
