use time::Date;

use crate::extract::JobCard;

pub fn render_text(jobs: &[JobCard]) -> String {
    let mut out = format!("Total jobs scraped: {}\n", jobs.len());
    for job in jobs {
        out.push_str(&format!(
            "Title: {}, Company: {}, Location: {}, Date: {}, URL: {}\n",
            job.title, job.company, job.location, job.date, job.job_url
        ));
    }
    out
}

pub fn render_json(jobs: &[JobCard]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(jobs)
}

/// Earliest and latest posting dates among cards with a parseable date.
pub fn posting_range(jobs: &[JobCard]) -> Option<(Date, Date)> {
    let mut dates = jobs.iter().filter_map(JobCard::posted_on);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}
