use crate::error::UrlError;
use url::Url;

/// Canonical form used for visited-set membership: no fragment, no query and
/// at most one trailing slash removed. Never used for fetching or for output
/// paths.
pub fn normalize(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.set_query(None);

    let mut normalized = String::from(url);
    if normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Parses and normalizes `input`. Callers treat an error as "exclude this
/// link", never as a reason to stop the crawl.
pub fn normalize_url(input: &str) -> Result<String, UrlError> {
    let url = Url::parse(input).map_err(|source| UrlError::Invalid {
        input: input.to_string(),
        source,
    })?;
    Ok(normalize(&url))
}

/// Short source name derived from a hostname, e.g. `docs-example-com`.
pub fn slug_from_url(input: &str) -> String {
    Url::parse(input)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .map(|host| {
            let slug = host.replace('.', "-");
            slug.strip_prefix("www-").map(str::to_string).unwrap_or(slug)
        })
        .unwrap_or_else(|| "source".to_string())
}
