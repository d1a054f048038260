use crate::config::types::{Config, CrawlerConfig, GitHubConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Shortest pause allowed between search pages (milliseconds)
const MIN_PAGE_DELAY_MS: u64 = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_github_config(&config.github)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates endpoint URLs and the branch name
fn validate_github_config(config: &GitHubConfig) -> Result<(), ConfigError> {
    for (key, value) in [
        ("api-endpoint", &config.api_endpoint),
        ("html-endpoint", &config.html_endpoint),
        ("raw-endpoint", &config.raw_endpoint),
    ] {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", key, value, e)))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} must use http or https, got '{}'",
                key, value
            )));
        }
    }

    if !config.search_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "search-path must start with '/', got '{}'",
            config.search_path
        )));
    }

    if config.default_branch.is_empty() || config.default_branch.contains('/') {
        return Err(ConfigError::Validation(format!(
            "default-branch must be a single path segment, got '{}'",
            config.default_branch
        )));
    }

    if matches!(&config.token, Some(token) if token.trim().is_empty()) {
        return Err(ConfigError::Validation("token cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates pacing and timeout settings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_delay_ms < MIN_PAGE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "page-delay-ms must be >= {}ms, got {}ms",
            MIN_PAGE_DELAY_MS, config.page_delay_ms
        )));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < config.connect_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs ({}) must be >= connect-timeout-secs ({})",
            config.request_timeout_secs, config.connect_timeout_secs
        )));
    }

    if !config.timeout_hours.is_finite() || config.timeout_hours < 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout-hours must be a non-negative number, got {}",
            config.timeout_hours
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation("name cannot be empty".to_string()));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.name
        )));
    }

    if config.version.is_empty() {
        return Err(ConfigError::Validation("version cannot be empty".to_string()));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
