//! Data model for discovered contributions
//!
//! - [`CanonicalRecord`]: the storage-ready form of one metadata file
//! - Wire types for the two JSON payloads the crawler reads: the code-search
//!   envelope and the contents of a metadata file

mod record;
mod wire;

pub use record::{dedup_key, CanonicalRecord, UNKNOWN_AUTHOR};
pub use wire::{HitRepository, ItemContent, RepositoryOwner, SearchEnvelope, SearchHit};
