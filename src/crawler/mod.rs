//! Crawler module for discovering contributions
//!
//! This module contains the crawl engine:
//! - Per-crawl settings and search query selection
//! - HTTP fetching with connect and total timeouts
//! - Normalization of search hits into canonical records
//! - The repository staleness check
//! - Pagination with inter-page delay and early termination

mod coordinator;
mod fetcher;
mod normalizer;
mod settings;
pub mod staleness;

pub use coordinator::{crawl, Coordinator, CrawlReport, StopReason};
pub use fetcher::{auth_headers, build_http_client, FetchResponse, Fetcher};
pub use normalizer::{
    build_record, containing_path, derive_type, normalize_hit, normalize_page, ItemSkip,
    NormalizedPage, SkippedItem, TYPE_PREFIX,
};
pub use settings::{ContributionType, CrawlSettings, MetadataFile, PageCursor};
