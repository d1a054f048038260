//! Per-crawl settings and search query selection

use crate::config::Config;
use std::fmt;
use std::time::Duration;

/// Search expression for activity metadata files, newest index first
const ACTIVITY_SEARCH_QUERY: &str = "sort=indexed&order=desc&q=filename%3Aactivity.json+flogo";

/// Search expression for trigger metadata files, newest index first
const TRIGGER_SEARCH_QUERY: &str = "sort=indexed&order=desc&q=filename%3Atrigger.json+flogo";

/// Which kind of contribution a crawl looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContributionType {
    Trigger,
    Activity,
}

impl ContributionType {
    /// Maps a caller-supplied label to a contribution type
    ///
    /// Only the exact label `"Trigger"` selects triggers; anything else means
    /// activities.
    pub fn from_label(label: &str) -> Self {
        if label == "Trigger" {
            Self::Trigger
        } else {
            Self::Activity
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trigger => "Trigger",
            Self::Activity => "Activity",
        }
    }

    /// Query string (without `page`) sent to the code-search endpoint
    pub fn search_query(&self) -> &'static str {
        match self {
            Self::Trigger => TRIGGER_SEARCH_QUERY,
            Self::Activity => ACTIVITY_SEARCH_QUERY,
        }
    }

    /// The metadata file the search targets
    pub fn metadata_file(&self) -> MetadataFile {
        match self {
            Self::Trigger => MetadataFile::Trigger,
            Self::Activity => MetadataFile::Activity,
        }
    }
}

impl From<&str> for ContributionType {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl fmt::Display for ContributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata filenames the crawler knows how to peel off a file path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFile {
    Activity,
    Trigger,
}

impl MetadataFile {
    pub const ALL: [MetadataFile; 2] = [MetadataFile::Activity, MetadataFile::Trigger];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Activity => "activity.json",
            Self::Trigger => "trigger.json",
        }
    }

    /// Finds the known metadata file named by the last segment of `path`
    pub fn for_path(path: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|file| file.strip_from(path).is_some())
    }

    /// Returns `path` without this file's name
    ///
    /// The name must be a whole path segment: `a/activity.json` matches,
    /// `a/myactivity.json` does not.
    pub fn strip_from<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_suffix(self.file_name())
            .filter(|dir| dir.is_empty() || dir.ends_with('/'))
    }
}

/// Immutable settings for one crawl invocation
///
/// Built once from [`Config`] and handed to every component, so nothing in
/// the crawl reads process-wide state.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub api_endpoint: String,
    pub search_path: String,
    pub html_endpoint: String,
    pub raw_endpoint: String,
    pub default_branch: String,
    /// Pause between two search page requests
    pub page_delay: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_endpoint: config.github.api_endpoint.clone(),
            search_path: config.github.search_path.clone(),
            html_endpoint: config.github.html_endpoint.clone(),
            raw_endpoint: config.github.raw_endpoint.clone(),
            default_branch: config.github.default_branch.clone(),
            page_delay: Duration::from_millis(config.crawler.page_delay_ms),
            connect_timeout: Duration::from_secs(config.crawler.connect_timeout_secs),
            request_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            user_agent: format!(
                "{}/{} (+{})",
                config.user_agent.name, config.user_agent.version, config.user_agent.contact_url
            ),
        }
    }

    /// URL of one search result page
    ///
    /// Page 1 is requested without a `page` parameter.
    pub fn search_url(&self, contribution: ContributionType, page: u32) -> String {
        let base = format!(
            "{}{}?{}",
            self.api_endpoint.trim_end_matches('/'),
            self.search_path,
            contribution.search_query()
        );

        if page > 1 {
            format!("{}&page={}", base, page)
        } else {
            base
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.github.com".to_string(),
            search_path: "/search/code".to_string(),
            html_endpoint: "https://github.com".to_string(),
            raw_endpoint: "https://raw.githubusercontent.com".to_string(),
            default_branch: "master".to_string(),
            page_delay: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("fdio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Position of a crawl within the search results
#[derive(Debug, Clone)]
pub struct PageCursor {
    pub contribution: ContributionType,
    pub page: u32,
    /// Known after page 1 has been fetched; 1 until then
    pub total_pages: u32,
}

impl PageCursor {
    pub fn new(contribution: ContributionType) -> Self {
        Self {
            contribution,
            page: 1,
            total_pages: 1,
        }
    }

    pub fn url(&self, settings: &CrawlSettings) -> String {
        settings.search_url(self.contribution, self.page)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Moves to the next page, returning false once the last page is passed
    pub fn advance(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }
}
