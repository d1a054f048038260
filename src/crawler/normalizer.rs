//! Turns search hits into canonical records
//!
//! Each hit's raw metadata file is fetched and mapped field by field. Any
//! problem with a single hit drops that hit and nothing else: the reason is
//! returned as an [`ItemSkip`] so the crawl can report it.

use crate::crawler::{CrawlSettings, Fetcher, MetadataFile};
use crate::github::{contribution_url, raw_content_url};
use crate::model::{CanonicalRecord, ItemContent, SearchHit, UNKNOWN_AUTHOR};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Prefix every contribution `type` value starts with (`flogo:activity`)
pub const TYPE_PREFIX: &str = "flogo:";

/// Why a search hit produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemSkip {
    #[error("search hit is malformed: {0}")]
    InvalidHit(String),

    #[error("invalid file URL: {0}")]
    InvalidUrl(String),

    #[error("fetching content failed: {0}")]
    Fetch(String),

    #[error("content request returned HTTP {0}")]
    Status(u16),

    #[error("content is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("content has no type field")]
    MissingType,

    #[error("type '{0}' does not start with 'flogo:'")]
    MalformedType(String),

    #[error("unrecognized metadata file in '{0}'")]
    UnknownFilename(String),

    #[error("content has no name")]
    MissingName,
}

impl ItemSkip {
    /// Skips that only mean "not a contribution file" and are not worth a warning
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::MissingType | Self::MissingName)
    }
}

/// A hit that was dropped, with where it came from
#[derive(Debug, Clone)]
pub struct SkippedItem {
    /// Browsable URL of the hit, or its position when it has none
    pub source: String,
    pub reason: ItemSkip,
}

/// Outcome of normalizing one search page
#[derive(Debug, Default)]
pub struct NormalizedPage {
    /// Records in search order
    pub records: Vec<CanonicalRecord>,
    pub skipped: Vec<SkippedItem>,
}

/// Normalizes every item of a search page, strictly in order
pub async fn normalize_page(
    fetcher: &Fetcher,
    settings: &CrawlSettings,
    headers: Option<&HeaderMap>,
    items: &[Value],
) -> NormalizedPage {
    let mut page = NormalizedPage::default();

    for (index, item) in items.iter().enumerate() {
        let source = item
            .get("html_url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("item #{}", index + 1));

        let outcome = match SearchHit::deserialize(item) {
            Ok(hit) => normalize_hit(fetcher, settings, headers, &hit).await,
            Err(e) => Err(ItemSkip::InvalidHit(e.to_string())),
        };

        match outcome {
            Ok(record) => {
                tracing::debug!("Added {} to the list", record.dedup_key());
                page.records.push(record);
            }
            Err(reason) => {
                if reason.is_silent() {
                    tracing::debug!("Skipping {}: {}", source, reason);
                } else {
                    tracing::warn!("Skipping {}: {}", source, reason);
                }
                page.skipped.push(SkippedItem { source, reason });
            }
        }
    }

    page
}

/// Fetches the raw metadata file behind `hit` and normalizes it
pub async fn normalize_hit(
    fetcher: &Fetcher,
    settings: &CrawlSettings,
    headers: Option<&HeaderMap>,
    hit: &SearchHit,
) -> Result<CanonicalRecord, ItemSkip> {
    let content_url = raw_content_url(&hit.html_url, &settings.raw_endpoint)
        .map_err(|e| ItemSkip::InvalidUrl(format!("{}: {}", hit.html_url, e)))?;

    let response = fetcher
        .fetch(&content_url, headers)
        .await
        .map_err(|e| ItemSkip::Fetch(e.to_string()))?;

    if !response.status.is_success() {
        return Err(ItemSkip::Status(response.status.as_u16()));
    }

    let content: ItemContent = serde_json::from_slice(&response.body)
        .map_err(|e| ItemSkip::InvalidJson(format!("{}: {}", content_url, e)))?;

    build_record(hit, content, settings)
}

/// Maps a parsed metadata file onto a record
///
/// Rules, in order: `type` must be present; the file path must end in a
/// known metadata filename; `type` loses its prefix and any colons; author
/// and description get defaults; `name` must be present and non-empty.
pub fn build_record(
    hit: &SearchHit,
    content: ItemContent,
    settings: &CrawlSettings,
) -> Result<CanonicalRecord, ItemSkip> {
    let raw_type = content.kind.ok_or(ItemSkip::MissingType)?;

    let dir_path = containing_path(&hit.path)?;
    let kind = derive_type(&raw_type)?;

    let author = content.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let description = content.description.unwrap_or_default();

    let name = content
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or(ItemSkip::MissingName)?;

    Ok(CanonicalRecord {
        name,
        kind,
        description,
        author,
        url: contribution_url(
            &settings.html_endpoint,
            &hit.repository.full_name,
            &settings.default_branch,
            dir_path,
        ),
        uploaded_on: String::new(),
        showcase: String::new(),
    })
}

/// Directory part of a metadata file path, keeping the trailing `/`
pub fn containing_path(path: &str) -> Result<&str, ItemSkip> {
    MetadataFile::for_path(path)
        .and_then(|file| file.strip_from(path))
        .ok_or_else(|| ItemSkip::UnknownFilename(path.to_string()))
}

/// `flogo:activity` -> `activity`
pub fn derive_type(raw: &str) -> Result<String, ItemSkip> {
    let kind: String = raw
        .strip_prefix(TYPE_PREFIX)
        .ok_or_else(|| ItemSkip::MalformedType(raw.to_string()))?
        .chars()
        .filter(|c| *c != ':')
        .collect();

    if kind.is_empty() {
        return Err(ItemSkip::MalformedType(raw.to_string()));
    }
    Ok(kind)
}
