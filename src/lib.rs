//! Batch scraper for paginated job-search results.
//!
//! A JSON config lists search queries; each query is fetched page by page
//! with retries, every page is parsed into [`JobCard`]s, and the cards of all
//! queries are returned as one list.

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod report;
pub mod search;

pub use config::{Config, SearchQuery};
pub use error::{Result, ScrapeError};
pub use extract::{JobCard, transform};
pub use fetch::Fetcher;
pub use search::JobScraper;
