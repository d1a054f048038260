//! Crawl coordinator - pagination and early termination
//!
//! The coordinator walks the code-search results page by page:
//! - fetches a page and validates its envelope
//! - normalizes the page's hits and hands them to the sink as one batch
//! - checks how stale the last normalized repository is and stops once it
//!   exceeds the caller's threshold
//! - sleeps between pages to stay inside the search API budget
//!
//! Everything runs in sequence. Page N+1 is never requested before page N's
//! batch is in the sink.

use crate::crawler::normalizer::{normalize_page, SkippedItem};
use crate::crawler::staleness::last_update_hours;
use crate::crawler::{ContributionType, CrawlSettings, FetchResponse, Fetcher, PageCursor};
use crate::github::{last_page, repository_url};
use crate::model::SearchEnvelope;
use crate::storage::RecordSink;
use crate::FdioError;
use reqwest::header::{HeaderMap, LINK};
use serde_json::Value;
use std::fmt;

/// How a successful crawl ended
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// Every page was processed
    Exhausted,

    /// The last repository seen had been idle longer than the threshold
    Stale { repository: String, hours: f64 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("all pages processed"),
            Self::Stale { repository, hours } => {
                write!(f, "{} last updated {:.1} hours ago", repository, hours)
            }
        }
    }
}

/// Summary of a successful crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub contribution: ContributionType,

    /// Page count announced by the first page
    pub pages_total: u32,

    pub pages_fetched: u32,

    /// Records handed to the sink across all batches
    pub records_emitted: u64,

    /// Hits dropped along the way, with the reason for each
    pub skipped: Vec<SkippedItem>,

    pub stop: StopReason,
}

impl CrawlReport {
    pub fn new(contribution: ContributionType) -> Self {
        Self {
            contribution,
            pages_total: 0,
            pages_fetched: 0,
            records_emitted: 0,
            skipped: Vec::new(),
            stop: StopReason::Exhausted,
        }
    }

    pub fn stopped_early(&self) -> bool {
        matches!(self.stop, StopReason::Stale { .. })
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<'a> {
    settings: &'a CrawlSettings,
    fetcher: Fetcher,
    headers: HeaderMap,
}

impl<'a> Coordinator<'a> {
    /// Creates a coordinator with its own HTTP client
    ///
    /// `headers` are forwarded on every request of the crawl.
    pub fn new(settings: &'a CrawlSettings, headers: HeaderMap) -> Result<Self, FdioError> {
        Ok(Self {
            settings,
            fetcher: Fetcher::new(settings)?,
            headers,
        })
    }

    /// Runs one crawl
    ///
    /// `timeout_hours` of `0` disables the staleness check. Batches already
    /// handed to the sink stay there when a later page fails.
    pub async fn run<S>(
        &self,
        sink: &mut S,
        timeout_hours: f64,
        contribution: ContributionType,
    ) -> Result<CrawlReport, FdioError>
    where
        S: RecordSink + ?Sized,
    {
        let mut report = CrawlReport::new(contribution);
        let mut cursor = PageCursor::new(contribution);
        tracing::info!(
            "Searching for {} files",
            contribution.metadata_file().file_name()
        );

        loop {
            let url = cursor.url(self.settings);
            tracing::info!("Send request to {}", url);

            let response = self.fetcher.fetch(&url, Some(&self.headers)).await?;
            let items = parse_envelope(&url, cursor.page, &response)?;

            // Page count is read once; later pages are assumed to agree
            if cursor.page == 1 {
                cursor.total_pages = match response.header(LINK.as_str()) {
                    Some(link) => last_page(link, &url)
                        .map_err(|e| FdioError::EnvelopeParse {
                            url: url.clone(),
                            page: 1,
                            message: e.to_string(),
                        })?
                        .unwrap_or(1),
                    None => 1,
                };
                report.pages_total = cursor.total_pages;
                tracing::info!("Found a total number of {} pages", cursor.total_pages);
            }

            let page = normalize_page(&self.fetcher, self.settings, Some(&self.headers), &items).await;
            tracing::info!(
                "Page {}/{}: {} records from {} hits",
                cursor.page,
                cursor.total_pages,
                page.records.len(),
                items.len()
            );

            sink.insert_batch(&page.records)?;
            report.pages_fetched += 1;
            report.records_emitted += page.records.len() as u64;
            report.skipped.extend(page.skipped);

            if timeout_hours != 0.0 {
                match page.records.last() {
                    Some(last) => {
                        let repository = repository_url(&last.url, &self.settings.html_endpoint);
                        let hours =
                            last_update_hours(&self.fetcher, repository, Some(&self.headers))
                                .await?;

                        if hours > timeout_hours {
                            tracing::info!(
                                "Maximum timeout reached. Last repo update was {:.1} hours ago ({})",
                                hours,
                                repository
                            );
                            report.stop = StopReason::Stale {
                                repository: repository.to_string(),
                                hours,
                            };
                            return Ok(report);
                        }
                    }
                    None => {
                        tracing::debug!(
                            "Page {} produced no records, skipping staleness check",
                            cursor.page
                        );
                    }
                }
            }

            if !cursor.advance() {
                break;
            }

            tokio::time::sleep(self.settings.page_delay).await;
        }

        tracing::info!(
            "Crawl finished: {} pages, {} records, {} skipped",
            report.pages_fetched,
            report.records_emitted,
            report.skipped.len()
        );

        Ok(report)
    }
}

/// Extracts the `items` array from a search response
fn parse_envelope(url: &str, page: u32, response: &FetchResponse) -> Result<Vec<Value>, FdioError> {
    let envelope_error = |message: String| FdioError::EnvelopeParse {
        url: url.to_string(),
        page,
        message: format!("HTTP {}: {}", response.status.as_u16(), message),
    };

    let envelope: SearchEnvelope =
        serde_json::from_slice(&response.body).map_err(|e| envelope_error(e.to_string()))?;

    if let Some(total) = envelope.total_count {
        tracing::debug!("Page {} reports {} matching files in total", page, total);
    }

    if envelope.incomplete_results == Some(true) {
        tracing::warn!("Search results for page {} are incomplete", page);
    }

    match envelope.items {
        Some(items) => Ok(items),
        None => Err(envelope_error(match envelope.message {
            Some(message) => format!("response has no items ({})", message),
            None => "response has no items".to_string(),
        })),
    }
}

/// Runs a crawl with a fresh [`Coordinator`]
///
/// # Example
///
/// ```no_run
/// use fdio::crawler::{crawl, ContributionType, CrawlSettings};
/// use fdio::storage::MemorySink;
/// use reqwest::header::HeaderMap;
///
/// # async fn example() -> Result<(), fdio::FdioError> {
/// let settings = CrawlSettings::default();
/// let mut sink = MemorySink::new();
/// let report = crawl(&settings, &HeaderMap::new(), &mut sink, 48.0, ContributionType::Trigger).await?;
/// println!("{} records", report.records_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn crawl<S>(
    settings: &CrawlSettings,
    headers: &HeaderMap,
    sink: &mut S,
    timeout_hours: f64,
    contribution: ContributionType,
) -> Result<CrawlReport, FdioError>
where
    S: RecordSink + ?Sized,
{
    Coordinator::new(settings, headers.clone())?
        .run(sink, timeout_hours, contribution)
        .await
}
