use std::{collections::BTreeMap, path::Path};

use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use url::Url;

use crate::error::{Result, ScrapeError};

pub const DEFAULT_SEARCH_URL: &str =
    "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
pub const DEFAULT_JOB_VIEW_URL: &str = "https://www.linkedin.com/jobs/view/";

/// Proxy map keys accepted in `proxies`.
pub const PROXY_SCHEMES: &[&str] = &["http", "https", "all"];

/// One search to run against the job search endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: String,
    #[serde(default)]
    pub location: String,
    /// Work-type filter (on-site / remote / hybrid codes), passed through as-is.
    #[serde(rename = "f_WT", default)]
    pub work_type: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_ms: 1000,
            timeout_ms: 5000,
        }
    }
}

/// Random pause between consecutive pages of a query. Zero disables it.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Pacing {
    pub min_ms: u64,
    pub max_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search_queries: Vec<SearchQuery>,
    pub pages_to_scrape: usize,
    /// Posting age filter, sent as `f_TPR` (e.g. `r86400` for the last day).
    #[serde(default)]
    pub timespan: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub proxies: BTreeMap<String, String>,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default = "default_search_url")]
    pub search_url: Url,
    #[serde(default = "default_job_view_url")]
    pub job_view_url: Url,
    #[serde(default)]
    pub pacing: Pacing,
    #[serde(default)]
    pub respect_robots_txt: bool,
    #[serde(default)]
    pub stop_on_empty_page: bool,
}

fn default_search_url() -> Url {
    Url::parse(DEFAULT_SEARCH_URL).expect("default search url is valid")
}

fn default_job_view_url() -> Url {
    Url::parse(DEFAULT_JOB_VIEW_URL).expect("default job view url is valid")
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScrapeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.attempts == 0 {
            return Err(ScrapeError::InvalidConfig(
                "retry.attempts must be at least 1".into(),
            ));
        }
        if self.pacing.min_ms > self.pacing.max_ms {
            return Err(ScrapeError::InvalidConfig(format!(
                "pacing.min_ms ({}) exceeds pacing.max_ms ({})",
                self.pacing.min_ms, self.pacing.max_ms
            )));
        }
        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ScrapeError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            HeaderValue::from_str(value).map_err(|e| ScrapeError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(scheme) = self
            .proxies
            .keys()
            .find(|k| !PROXY_SCHEMES.contains(&k.as_str()))
        {
            return Err(ScrapeError::InvalidConfig(format!(
                "unknown proxy scheme {scheme:?}, expected one of {PROXY_SCHEMES:?}"
            )));
        }
        Ok(())
    }

    /// The configured `User-Agent`, matched case-insensitively.
    pub fn user_agent(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("user-agent"))
            .map(|(_, v)| v.as_str())
    }
}
