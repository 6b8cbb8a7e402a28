use std::time::Duration;

use rand::{Rng, rng};
use reqwest::{
    Proxy, StatusCode,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue},
};
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use crate::{
    config::{Config, RetryPolicy},
    error::{Result, ScrapeError},
};

// -------------------------
// Client setup
// -------------------------

/// HTTP client shared by every page of a run, plus the retry policy it applies.
pub struct Fetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers(config)?)
            .redirect(reqwest::redirect::Policy::limited(8))
            .timeout(Duration::from_millis(config.retry.timeout_ms));

        if config.user_agent().is_none() {
            builder = builder.user_agent(random_desktop_ua());
        }

        if config.proxies.is_empty() {
            // ignore HTTP_PROXY and friends from the environment too
            builder = builder.no_proxy();
        }
        for (scheme, target) in &config.proxies {
            let proxy = match scheme.as_str() {
                "http" => Proxy::http(target),
                "https" => Proxy::https(target),
                _ => Proxy::all(target),
            }
            .map_err(|source| ScrapeError::InvalidProxy {
                scheme: scheme.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(ScrapeError::Client)?;
        Ok(Self {
            client,
            retry: config.retry,
        })
    }

    /// Fetches `url`, retrying up to `retry.attempts` times.
    ///
    /// Timeouts back off for `retry.delay_ms` before the next attempt; other
    /// transport errors retry straight away. Any HTTP response ends the loop,
    /// whatever its status. Returns `None` once every attempt has failed.
    pub async fn get_with_retry(&self, url: &Url) -> Option<String> {
        let delay = Duration::from_millis(self.retry.delay_ms);

        for attempt in 1..=self.retry.attempts {
            match self.fetch_once(url).await {
                Ok((_, body)) => return Some(body),
                Err(e) if e.is_timeout() => {
                    warn!(
                        %url,
                        attempt,
                        "timeout occurred, retrying in {}ms",
                        self.retry.delay_ms
                    );
                    if attempt < self.retry.attempts {
                        sleep(delay).await;
                    }
                }
                Err(e) => {
                    error!(%url, attempt, error = %e, "error while retrieving url");
                }
            }
        }

        warn!(%url, attempts = self.retry.attempts, "giving up on url");
        None
    }

    /// Single best-effort GET. Transport failures and non-success statuses
    /// come back as an empty body.
    pub async fn get_text(&self, url: &Url) -> String {
        match self.fetch_once(url).await {
            Ok((status, body)) if status.is_success() => body,
            Ok(_) => String::new(),
            Err(e) => {
                debug!(%url, error = %e, "best-effort fetch failed");
                String::new()
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> reqwest::Result<(StatusCode, String)> {
        let rsp = self.client.get(url.clone()).send().await?;

        // capture before .text() consumes the response
        let status = rsp.status();
        let final_url = rsp.url().clone();
        let text = rsp.text().await?;

        if status.is_success() {
            debug!(%url, %status, %final_url, len = text.len(), "fetched");
        } else {
            warn!(%url, %status, %final_url, len = text.len(), "non-success status");
        }
        Ok((status, text))
    }
}

// -------------------------
// Header helpers
// -------------------------

fn default_headers(config: &Config) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    h.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    // configured headers win over the defaults above
    for (name, value) in &config.headers {
        let invalid = |reason: String| ScrapeError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        h.insert(name, value);
    }
    Ok(h)
}

fn random_desktop_ua() -> String {
    const UAS: &[&str] = &[
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    ];
    let i = rng().random_range(0..UAS.len());
    UAS[i].to_string()
}
