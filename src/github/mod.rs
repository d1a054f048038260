//! GitHub URL handling for fdio
//!
//! This module provides the string-level knowledge of how GitHub lays out its
//! URLs: rewriting a browsable file URL to its raw-content twin, building and
//! truncating contribution URLs, and reading pagination out of `Link` headers.

mod link_header;
mod urls;

pub use link_header::{last_page, parse_link_header, LastPageError, Link};
pub use urls::{contribution_url, raw_content_url, repository_url, TREE_MARKER};
