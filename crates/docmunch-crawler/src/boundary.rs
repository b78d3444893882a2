//! Crawl boundaries: which discovered links belong to the documentation site.
//!
//! A boundary is an origin plus a path prefix that always ends in `/`. It is
//! derived from the start URL, may be widened once from the first page's
//! navigation links, and is frozen after that.

use crate::error::CrawlError;
use url::{Origin, Url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlScope {
    origin: Origin,
    path_prefix: String,
}

impl CrawlScope {
    /// Scope of a start URL: its origin and its path without the final
    /// segment. Root-level pages get `/`.
    pub fn from_url(url: &Url) -> Result<Self, CrawlError> {
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(CrawlError::UnsupportedScheme { url: url.clone() });
        }

        Ok(Self {
            origin,
            path_prefix: parent_path(url.path()).to_string(),
        })
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.is_same_origin(url) && url.path().starts_with(&self.path_prefix)
    }

    fn with_prefix(&self, path_prefix: String) -> Self {
        Self {
            origin: self.origin.clone(),
            path_prefix,
        }
    }
}

/// True iff `candidate` parses, shares the scope's origin and its path starts
/// with the scope's prefix. Unparsable candidates are simply out of bounds.
pub fn is_in_bounds(candidate: &str, scope: &CrawlScope) -> bool {
    Url::parse(candidate).is_ok_and(|url| scope.contains(&url))
}

/// Longest common whole-segment prefix of the directories of `start` and every
/// URL in `discovered`, rendered with a trailing `/`.
///
/// Segments are compared whole, so `/docs/v2` and `/docs/v20` share `/docs/`
/// only. The start URL is always part of the sample, so the result is never
/// narrower than the start URL's own scope.
pub fn widen(start: &Url, discovered: &[Url]) -> String {
    let mut common = directory_segments(start.path());

    for url in discovered {
        let segments = directory_segments(url.path());
        let shared = common
            .iter()
            .zip(segments.iter())
            .take_while(|(a, b)| a == b)
            .count();
        common.truncate(shared);
    }

    if common.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", common.join("/"))
    }
}

/// Two-phase boundary state. The scope starts provisional and is finalized
/// exactly once after the first page has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundary {
    Provisional(CrawlScope),
    Final(CrawlScope),
}

impl Boundary {
    pub fn provisional(scope: CrawlScope) -> Self {
        Boundary::Provisional(scope)
    }

    pub fn scope(&self) -> &CrawlScope {
        match self {
            Boundary::Provisional(scope) | Boundary::Final(scope) => scope,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Boundary::Final(_))
    }

    /// Freezes the boundary, optionally replacing the prefix. A boundary that
    /// is already final is returned untouched.
    pub fn finalize(self, widened: Option<String>) -> Self {
        match self {
            Boundary::Provisional(scope) => match widened {
                Some(prefix) => Boundary::Final(scope.with_prefix(prefix)),
                None => Boundary::Final(scope),
            },
            final_boundary @ Boundary::Final(_) => final_boundary,
        }
    }

    pub fn into_scope(self) -> CrawlScope {
        match self {
            Boundary::Provisional(scope) | Boundary::Final(scope) => scope,
        }
    }
}

fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}

fn directory_segments(path: &str) -> Vec<&str> {
    parent_path(path)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scope(url: &str) -> CrawlScope {
        CrawlScope::from_url(&Url::parse(url).unwrap()).unwrap()
    }

    #[rstest]
    #[case("https://docs.example.com/api/v2/users", "/api/v2/")]
    #[case("https://example.com/docs", "/")]
    #[case("https://example.com/docs/getting-started", "/docs/")]
    #[case("https://example.com/docs/", "/docs/")]
    #[case("https://example.com/", "/")]
    #[case("https://example.com", "/")]
    fn test_scope_from_url(#[case] url: &str, #[case] expected_prefix: &str) {
        let scope = scope(url);
        assert_eq!(scope.path_prefix(), expected_prefix);
        assert!(scope.path_prefix().ends_with('/'));
    }

    #[test]
    fn test_scope_origin() {
        let scope = scope("https://docs.example.com/api/v2/users");
        assert_eq!(
            scope.origin().ascii_serialization(),
            "https://docs.example.com"
        );
    }

    #[test]
    fn test_scope_rejects_opaque_origin() {
        let url = Url::parse("data:text/html,hello").unwrap();
        assert!(matches!(
            CrawlScope::from_url(&url),
            Err(CrawlError::UnsupportedScheme { .. })
        ));
    }

    #[rstest]
    #[case("https://docs.example.com/api/v2/endpoints", true)]
    #[case("https://docs.example.com/api/v2/", true)]
    #[case("https://docs.example.com/api/v2/deep/nested?x=1#y", true)]
    #[case("https://other.com/api/v2/endpoints", false)]
    #[case("http://docs.example.com/api/v2/endpoints", false)]
    #[case("https://docs.example.com:8443/api/v2/endpoints", false)]
    #[case("https://docs.example.com/blog/post", false)]
    #[case("https://docs.example.com/api/v20/users", false)]
    #[case("not-a-url", false)]
    #[case("", false)]
    fn test_is_in_bounds(#[case] candidate: &str, #[case] expected: bool) {
        let scope = scope("https://docs.example.com/api/v2/users");
        assert_eq!(is_in_bounds(candidate, &scope), expected);
    }

    #[rstest]
    #[case(
        "https://x.com/docs/v2/page",
        vec!["https://x.com/docs/v2/page", "https://x.com/docs/v2/other", "https://x.com/docs/intro"],
        "/docs/"
    )]
    #[case(
        "https://x.com/docs/v2/page",
        vec!["https://x.com/docs/v2/other", "https://x.com/docs/v2/more/deep"],
        "/docs/v2/"
    )]
    #[case(
        "https://x.com/docs/v2/page",
        vec!["https://x.com/docs/v20/page"],
        "/docs/"
    )]
    #[case(
        "https://x.com/docs/v2/page",
        vec!["https://x.com/pricing"],
        "/"
    )]
    #[case("https://x.com/docs/v2/page", vec![], "/docs/v2/")]
    fn test_widen(#[case] start: &str, #[case] discovered: Vec<&str>, #[case] expected: &str) {
        let start = Url::parse(start).unwrap();
        let discovered: Vec<Url> = discovered
            .into_iter()
            .map(|u| Url::parse(u).unwrap())
            .collect();
        assert_eq!(widen(&start, &discovered), expected);
    }

    #[test]
    fn test_widen_never_narrows() {
        let start = Url::parse("https://x.com/docs/v2/page").unwrap();
        let initial = scope(start.as_str());
        let widened = widen(
            &start,
            &[Url::parse("https://x.com/docs/v2/sub/section/leaf").unwrap()],
        );
        assert!(initial.path_prefix().starts_with(&widened));
    }

    #[test]
    fn test_boundary_finalizes_once() {
        let boundary = Boundary::provisional(scope("https://x.com/docs/v2/page"));
        assert!(!boundary.is_final());

        let boundary = boundary.finalize(Some("/docs/".to_string()));
        assert!(boundary.is_final());
        assert_eq!(boundary.scope().path_prefix(), "/docs/");

        let boundary = boundary.finalize(Some("/".to_string()));
        assert_eq!(boundary.scope().path_prefix(), "/docs/");
    }

    #[test]
    fn test_boundary_finalize_without_widening_keeps_prefix() {
        let boundary = Boundary::provisional(scope("https://x.com/docs/v2/page")).finalize(None);
        assert!(boundary.is_final());
        assert_eq!(boundary.into_scope().path_prefix(), "/docs/v2/");
    }
}
