use serde::{Deserialize, Serialize};

/// Author recorded when a metadata file does not name one
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// One normalized contribution, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Contribution name, never empty
    pub name: String,

    /// Contribution kind with the `flogo:` prefix removed (e.g. `activity`)
    #[serde(rename = "type")]
    pub kind: String,

    pub description: String,

    pub author: String,

    /// Directory holding the metadata file on the default branch
    pub url: String,

    /// Filled in by a later publishing stage; empty at crawl time
    #[serde(rename = "uploadedon")]
    pub uploaded_on: String,

    /// Filled in by a later curation stage; empty at crawl time
    pub showcase: String,
}

impl CanonicalRecord {
    /// Key downstream consumers use to recognize the same contribution
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.author, &self.name)
    }
}

/// Builds `lowercase(author)/lowercase(name without spaces)`
///
/// # Example
///
/// ```
/// assert_eq!(fdio::dedup_key("Retgits", "Send Mail"), "retgits/sendmail");
/// ```
pub fn dedup_key(author: &str, name: &str) -> String {
    let name: String = name.chars().filter(|c| *c != ' ').collect();
    format!("{}/{}", author.to_lowercase(), name.to_lowercase())
}
