use serde::Deserialize;

/// Main configuration structure for fdio
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Remote endpoints and credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// Root of the REST API (search requests go here)
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Path of the code-search endpoint below `api_endpoint`
    #[serde(default = "default_search_path")]
    pub search_path: String,

    /// Host serving browsable repository pages
    #[serde(default = "default_html_endpoint")]
    pub html_endpoint: String,

    /// Host serving raw file content
    #[serde(default = "default_raw_endpoint")]
    pub raw_endpoint: String,

    /// Branch name used when building contribution URLs
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Optional API token, sent as `Authorization: token <value>`
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            search_path: default_search_path(),
            html_endpoint: default_html_endpoint(),
            raw_endpoint: default_raw_endpoint(),
            default_branch: default_branch(),
            token: None,
        }
    }
}

/// Crawl pacing and timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Pause between two search page requests (milliseconds)
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// TCP connect timeout (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Total request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Stop paging once the last repository seen is idle for longer than
    /// this many hours. `0` disables the check.
    #[serde(default)]
    pub timeout_hours: f64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: default_page_delay_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            timeout_hours: 0.0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub name: String,

    /// Version of the crawler
    pub version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_api_endpoint() -> String {
    "https://api.github.com".to_string()
}

fn default_search_path() -> String {
    "/search/code".to_string()
}

fn default_html_endpoint() -> String {
    "https://github.com".to_string()
}

fn default_raw_endpoint() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_page_delay_ms() -> u64 {
    5000
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}
