use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use time::{Date, macros::format_description};
use tracing::{debug, warn};
use url::Url;

/// One job card lifted from a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCard {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Posting date as published in the card's `datetime` attribute, or empty.
    pub date: String,
    pub job_url: String,
}

impl JobCard {
    pub fn posted_on(&self) -> Option<Date> {
        Date::parse(&self.date, format_description!("[year]-[month]-[day]")).ok()
    }
}

// -------------------------
// Selectors
// -------------------------

struct CardSelectors {
    card_info: Selector,
    title: Vec<Selector>,
    company: Vec<Selector>,
    location: Selector,
    listdate: Vec<Selector>,
}

static SELECTORS: LazyLock<CardSelectors> = LazyLock::new(|| CardSelectors {
    card_info: sel("div.base-search-card__info"),
    title: vec![sel("h3.base-search-card__title"), sel("h3")],
    company: vec![
        sel("a.hidden-nested-link"),
        sel("h4.base-search-card__subtitle"),
    ],
    location: sel("span.job-search-card__location"),
    listdate: vec![
        sel("time.job-search-card__listdate"),
        sel("time.job-search-card__listdate--new"),
    ],
});

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

// -------------------------
// Parsing
// -------------------------

/// Parses every job card out of a results page.
///
/// `None` stands for a page that could not be fetched and yields no cards.
/// Cards missing a title or a posting id are skipped; every other field
/// degrades to an empty string.
pub fn transform(html: Option<&str>, job_view_url: &Url) -> Vec<JobCard> {
    let Some(html) = html else {
        warn!("empty page, no jobs found");
        return Vec::new();
    };

    let doc = Html::parse_document(html);
    let s = &*SELECTORS;

    let mut jobs = Vec::new();
    for (idx, info) in doc.select(&s.card_info).enumerate() {
        match parse_card(&info, s, job_view_url) {
            Some(job) => jobs.push(job),
            None => debug!(card = idx, "skipped card"),
        }
    }
    jobs
}

fn parse_card(info: &ElementRef, s: &CardSelectors, job_view_url: &Url) -> Option<JobCard> {
    let Some(title) = first_text(info, &s.title) else {
        warn!("card has no title, skipping");
        return None;
    };

    let Some(posting_id) = posting_id(info) else {
        warn!(%title, "card has no posting id, skipping");
        return None;
    };

    let company = first_text(info, &s.company).unwrap_or_default();
    let location = info
        .select(&s.location)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    let date = s
        .listdate
        .iter()
        .find_map(|sel| {
            info.select(sel)
                .find_map(|t| t.value().attr("datetime"))
        })
        .map(str::to_string)
        .unwrap_or_default();

    Some(JobCard {
        title,
        company,
        location,
        date,
        job_url: job_url(job_view_url, &posting_id),
    })
}

/// Trimmed text of the first element matched by the first selector that hits.
fn first_text(scope: &ElementRef, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|sel| scope.select(sel).next())
        .map(|e| e.text().collect::<String>().trim().to_string())
}

/// Last `:` segment of the enclosing card's `data-entity-urn`,
/// e.g. `urn:li:jobPosting:3791234567` -> `3791234567`.
fn posting_id(info: &ElementRef) -> Option<String> {
    let parent = info.parent().and_then(ElementRef::wrap)?;
    let urn = parent.value().attr("data-entity-urn")?;
    let id = urn.rsplit(':').next()?.trim();
    (!id.is_empty()).then(|| id.to_string())
}

fn job_url(job_view_url: &Url, posting_id: &str) -> String {
    let base = job_view_url.as_str();
    if base.ends_with('/') {
        format!("{base}{posting_id}/")
    } else {
        format!("{base}/{posting_id}/")
    }
}
