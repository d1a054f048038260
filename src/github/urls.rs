use url::Url;

/// Path marker separating a repository URL from a directory inside it
pub const TREE_MARKER: &str = "/tree/";

/// Path segment GitHub uses for the rendered view of a file
const BLOB_SEGMENT: &str = "blob";

/// Rewrites a browsable file URL into the URL of its raw content
///
/// `https://github.com/o/r/blob/<ref>/dir/activity.json` becomes
/// `<raw_endpoint>/o/r/<ref>/dir/activity.json`. The `blob` segment right
/// after `owner/repo` is removed; failing that, the first `blob` segment.
///
/// # Example
///
/// ```
/// use fdio::github::raw_content_url;
///
/// let raw = raw_content_url(
///     "https://github.com/acme/contrib/blob/4f2a/activity/log/activity.json",
///     "https://raw.githubusercontent.com",
/// )
/// .unwrap();
/// assert_eq!(
///     raw,
///     "https://raw.githubusercontent.com/acme/contrib/4f2a/activity/log/activity.json"
/// );
/// ```
pub fn raw_content_url(html_url: &str, raw_endpoint: &str) -> Result<String, url::ParseError> {
    let parsed = Url::parse(html_url)?;

    let mut segments: Vec<&str> = parsed.path().split('/').filter(|s| !s.is_empty()).collect();
    let index = if segments.get(2) == Some(&BLOB_SEGMENT) {
        Some(2)
    } else {
        segments.iter().position(|s| *s == BLOB_SEGMENT)
    };
    if let Some(index) = index {
        segments.remove(index);
    }

    Ok(format!(
        "{}/{}",
        raw_endpoint.trim_end_matches('/'),
        segments.join("/")
    ))
}

/// Builds the URL of the directory holding a metadata file
///
/// `dir_path` is the file path with the filename removed, so it is either
/// empty or ends with `/`.
pub fn contribution_url(html_endpoint: &str, full_name: &str, branch: &str, dir_path: &str) -> String {
    format!(
        "{}/{}/tree/{}/{}",
        html_endpoint.trim_end_matches('/'),
        full_name,
        branch,
        dir_path
    )
}

/// Returns the repository landing page for a contribution URL
///
/// When the URL starts with `html_endpoint`, the cut is made at the
/// [`TREE_MARKER`] that follows `owner/repo`, so owners or repositories named
/// `tree` keep their full path. Other URLs are cut at the first marker; a URL
/// without the marker is returned unchanged.
pub fn repository_url<'u>(contribution_url: &'u str, html_endpoint: &str) -> &'u str {
    let root = html_endpoint.trim_end_matches('/');

    if let Some(rest) = contribution_url.strip_prefix(root) {
        // `rest` is `/owner/repo/tree/...`; the third `/` ends the repository
        let repo_end = rest.match_indices('/').nth(2).map(|(index, _)| index);
        if let Some(end) = repo_end {
            if rest[end..].starts_with(TREE_MARKER) {
                return &contribution_url[..root.len() + end];
            }
        }
    }

    match contribution_url.find(TREE_MARKER) {
        Some(index) => &contribution_url[..index],
        None => contribution_url,
    }
}
