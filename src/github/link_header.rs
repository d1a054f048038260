//! Minimal reader for `Link` response headers
//!
//! Handles the `<target>; rel="a b"; other=x, <target>; ...` form GitHub
//! emits for paginated responses.

use thiserror::Error;
use url::Url;

/// One entry of a `Link` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Target URL between the angle brackets
    pub url: String,

    /// Relation types, lowercased
    pub rels: Vec<String>,
}

impl Link {
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// Parses every entry of a `Link` header value
///
/// Entries without a closing `>` end the scan; whatever was parsed up to that
/// point is returned.
pub fn parse_link_header(value: &str) -> Vec<Link> {
    let mut links = Vec::new();
    let mut rest = value;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let end = match after.find('>') {
            Some(end) => end,
            None => break,
        };

        let target = after[..end].trim().to_string();
        let tail = &after[end + 1..];
        let params_end = next_entry(tail);

        links.push(Link {
            url: target,
            rels: parse_rels(&tail[..params_end]),
        });

        rest = &tail[params_end..];
    }

    links
}

/// A `rel="last"` entry whose page number cannot be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LastPageError {
    #[error("last page target '{target}' is not a valid URL: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("last page target '{0}' has no positive numeric page parameter")]
    InvalidPage(String),
}

/// Reads the total page count from the `rel="last"` entry
///
/// Relative targets are resolved against `base`, the URL of the request the
/// header came with. Returns `Ok(None)` when the header has no `last`
/// relation; a `last` entry without a readable page number is an error.
pub fn last_page(value: &str, base: &str) -> Result<Option<u32>, LastPageError> {
    match parse_link_header(value)
        .into_iter()
        .find(|link| link.has_rel("last"))
    {
        Some(link) => page_param(&link.url, base).map(Some),
        None => Ok(None),
    }
}

fn page_param(target: &str, base: &str) -> Result<u32, LastPageError> {
    let invalid_target = |reason: url::ParseError| LastPageError::InvalidTarget {
        target: target.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(base)
        .and_then(|base| base.join(target))
        .map_err(invalid_target)?;

    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .filter(|page| *page > 0)
        .ok_or_else(|| LastPageError::InvalidPage(target.to_string()))
}

/// Offset of the comma that starts the next `<...>` entry
fn next_entry(s: &str) -> usize {
    let mut in_quotes = false;
    for (index, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes && s[index + 1..].trim_start().starts_with('<') => return index,
            _ => {}
        }
    }
    s.len()
}

fn parse_rels(params: &str) -> Vec<String> {
    params
        .split(';')
        .filter_map(|param| param.split_once('='))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
        .flat_map(|(_, value)| {
            value
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .map(|rel| rel.to_ascii_lowercase())
                .collect::<Vec<_>>()
        })
        .collect()
}
