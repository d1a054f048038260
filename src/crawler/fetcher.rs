//! HTTP request executor
//!
//! One GET per call with the connect and total timeouts from
//! [`CrawlSettings`]. There is no retry here; callers decide what a failure
//! means for the crawl.

use crate::crawler::CrawlSettings;
use crate::{ConfigError, FdioError, TransportErrorKind};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};

/// Response of a single GET
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Value of a header as text, if present and printable
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Builds the HTTP client shared by every request of a crawl
pub fn build_http_client(settings: &CrawlSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the header set carrying an API token, if one is given
pub fn auth_headers(token: Option<&str>) -> Result<HeaderMap, FdioError> {
    let mut headers = HeaderMap::new();

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("token {}", token.trim())).map_err(|_| {
            ConfigError::Validation("token contains characters not allowed in a header".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

/// Issues GET requests for the crawl
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(settings: &CrawlSettings) -> Result<Self, FdioError> {
        Ok(Self {
            client: build_http_client(settings)?,
        })
    }

    /// Fetches `url`, forwarding `headers` verbatim
    ///
    /// Any HTTP status is returned as data. Only transport problems
    /// (timeouts, refused connections, broken bodies) are errors.
    pub async fn fetch(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<FetchResponse, FdioError> {
        let mut request = self.client.get(url);
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }

        let response = request.send().await.map_err(|e| transport_error(url, e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?
            .to_vec();

        tracing::trace!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

/// Classifies a reqwest failure
fn transport_error(url: &str, error: reqwest::Error) -> FdioError {
    let kind = if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect(error.to_string())
    } else {
        TransportErrorKind::Other(error.to_string())
    };

    FdioError::Transport {
        url: url.to_string(),
        kind,
    }
}
