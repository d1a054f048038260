//! Repository staleness check
//!
//! Reads the "last commit" date rendered on a repository's landing page and
//! turns it into hours elapsed. GitHub renders it inside a `<relative-time>`
//! element (older layouts used `<time-ago>`) whose text looks like
//! `Jan 02, 2006`.

use crate::crawler::Fetcher;
use crate::FdioError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reqwest::header::HeaderMap;
use scraper::{Html, Selector};

/// Elements that carry the last-activity date
const TIME_SELECTOR: &str = "time-ago, relative-time";

/// Rendered date layout, e.g. `Jan 02, 2006`
pub const DATE_FORMAT: &str = "%b %d, %Y";

/// Hours since the last activity on the repository at `url`
pub async fn last_update_hours(
    fetcher: &Fetcher,
    url: &str,
    headers: Option<&HeaderMap>,
) -> Result<f64, FdioError> {
    last_update_hours_at(fetcher, url, headers, Utc::now()).await
}

/// Same as [`last_update_hours`], measured against a caller-supplied `now`
pub async fn last_update_hours_at(
    fetcher: &Fetcher,
    url: &str,
    headers: Option<&HeaderMap>,
    now: DateTime<Utc>,
) -> Result<f64, FdioError> {
    let response = fetcher.fetch(url, headers).await?;

    let updated = parse_last_update(&response.text()).ok_or_else(|| {
        FdioError::StalenessNotFound {
            url: url.to_string(),
        }
    })?;

    let hours = elapsed_hours(updated, now);
    tracing::debug!("{} last updated {} ({:.1} hours ago)", url, updated, hours);
    Ok(hours)
}

/// Finds the first time indicator in `html` and parses its date
///
/// The rendered text is tried first; the element's `datetime` attribute is
/// used when the text is empty or in another layout.
pub fn parse_last_update(html: &str) -> Option<DateTime<Utc>> {
    let selector = Selector::parse(TIME_SELECTOR).ok()?;
    let document = Html::parse_document(html);

    document.select(&selector).find_map(|element| {
        let text = element.text().collect::<String>();
        parse_rendered_date(text.trim()).or_else(|| {
            element
                .value()
                .attr("datetime")
                .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
                .map(|value| value.with_timezone(&Utc))
        })
    })
}

/// Parses `Jan 02, 2006` as midnight UTC of that day
pub fn parse_rendered_date(text: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// Wall-clock hours between `since` and `now`
pub fn elapsed_hours(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - since).num_seconds() as f64 / 3600.0
}
