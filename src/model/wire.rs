//! Typed views of the JSON the crawler consumes
//!
//! Every field a payload may omit is an `Option`, so presence is checked
//! explicitly by the code that reads it.

use serde::Deserialize;
use serde_json::Value;

/// Top level of a code-search response
///
/// Items stay untyped here so one malformed hit cannot sink the whole page;
/// each is decoded into a [`SearchHit`] separately.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEnvelope {
    pub items: Option<Vec<Value>>,

    #[serde(default)]
    pub total_count: Option<u64>,

    #[serde(default)]
    pub incomplete_results: Option<bool>,

    /// Present on API error bodies (rate limiting, bad credentials)
    #[serde(default)]
    pub message: Option<String>,
}

/// One matched file on a search result page
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// File path inside the repository
    pub path: String,

    /// Browsable URL of the file (`.../blob/<ref>/<path>`)
    pub html_url: String,

    pub repository: HitRepository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HitRepository {
    /// `owner/name`
    pub full_name: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub owner: Option<RepositoryOwner>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Fields read from an `activity.json` / `trigger.json` file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemContent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}
