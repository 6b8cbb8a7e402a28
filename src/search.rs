use std::time::Duration;

use rand::{Rng, rng};
use robotstxt::DefaultMatcher;
use tokio::time::sleep;
use tracing::{Instrument, info, info_span, warn};
use url::Url;

use crate::{
    config::{Config, SearchQuery},
    error::Result,
    extract::{JobCard, transform},
    fetch::Fetcher,
};

/// Results per page served by the search endpoint; `start` advances by this.
pub const PAGE_SIZE: usize = 25;

impl SearchQuery {
    /// URL of the zero-based `page` of this query's results.
    pub fn page_url(&self, search_url: &Url, timespan: &str, page: usize) -> Url {
        let mut u = search_url.clone();
        u.query_pairs_mut()
            .append_pair("keywords", &self.keywords)
            .append_pair("location", &self.location)
            .append_pair("f_WT", &self.work_type)
            .append_pair("geoId", "")
            .append_pair("f_TPR", timespan)
            .append_pair("start", &(PAGE_SIZE * page).to_string());
        u
    }
}

// -------------------------
// Scraper
// -------------------------

/// Runs every configured query, page by page, in order.
pub struct JobScraper {
    config: Config,
    fetcher: Fetcher,
}

impl JobScraper {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }

    /// Scrapes all queries and concatenates their cards in query, then page, order.
    pub async fn run(&self) -> Vec<JobCard> {
        let mut all_jobs = Vec::new();
        for query in &self.config.search_queries {
            let span = info_span!(
                "query",
                keywords = %query.keywords,
                location = %query.location
            );
            let jobs = self.scrape_query(query).instrument(span).await;
            all_jobs.extend(jobs);
        }
        all_jobs
    }

    pub async fn scrape_query(&self, query: &SearchQuery) -> Vec<JobCard> {
        let cfg = &self.config;

        if cfg.respect_robots_txt {
            let first = query.page_url(&cfg.search_url, &cfg.timespan, 0);
            if !self.robots_allows(&first).await {
                warn!(url = %first, "robots.txt disallows this query, skipping");
                return Vec::new();
            }
        }

        let mut jobs = Vec::new();
        for page in 0..cfg.pages_to_scrape {
            if page > 0 {
                self.pause().await;
            }

            let url = query.page_url(&cfg.search_url, &cfg.timespan, page);
            let html = self.fetcher.get_with_retry(&url).await;
            let page_jobs = transform(html.as_deref(), &cfg.job_view_url);
            let found = page_jobs.len();
            jobs.extend(page_jobs);

            info!(%url, page, cards = found, total = jobs.len(), "finished scraping page");

            if found == 0 && cfg.stop_on_empty_page {
                info!(page, "empty page, stopping query");
                break;
            }
        }
        jobs
    }

    async fn pause(&self) {
        let pacing = self.config.pacing;
        if pacing.max_ms == 0 {
            return;
        }
        let ms = rng().random_range(pacing.min_ms..=pacing.max_ms);
        sleep(Duration::from_millis(ms)).await;
    }

    async fn robots_allows(&self, url: &Url) -> bool {
        let Ok(robots_url) = url.join("/robots.txt") else {
            return true;
        };
        let robots_txt = self.fetcher.get_text(&robots_url).await;
        allowed_by_robots(&robots_txt, &robots_agent(&self.config), url)
    }
}

// -------------------------
// robots.txt helpers
// -------------------------

fn allowed_by_robots(robots_txt: &str, agent: &str, url: &Url) -> bool {
    let mut matcher = DefaultMatcher::default();
    matcher.one_agent_allowed_by_robots(robots_txt, agent, url.as_str())
}

/// Product token of the configured user agent (`Mozilla` when unset).
fn robots_agent(config: &Config) -> String {
    config
        .user_agent()
        .and_then(|ua| ua.split('/').next())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .unwrap_or("Mozilla")
        .to_string()
}
