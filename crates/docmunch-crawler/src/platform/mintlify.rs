use super::{PlatformId, PlatformStrategy, matches_any};
use crate::discover::LinkSource;
use regex_lite::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Matches `"href":"/path"` pairs, escaped or not, inside Next.js flight data.
const HREF_PATTERN: &str = r#"\\?"href\\?"\s*:\s*\\?"(/[a-z0-9][a-z0-9/-]*)\\?""#;

pub struct Mintlify;

impl PlatformStrategy for Mintlify {
    fn id(&self) -> PlatformId {
        PlatformId::Mintlify
    }

    fn detect(&self, _url: &Url, document: &Html) -> bool {
        matches_any(
            document,
            &[
                r#"meta[name="generator"][content*="Mintlify"]"#,
                "script[src*='mintlify']",
                "[data-mintlify]",
            ],
        )
    }

    fn content_selector(&self) -> &'static str {
        "article, main"
    }

    fn remove_selectors(&self) -> &'static [&'static str] {
        &[
            "nav",
            "header",
            "footer",
            "[role='navigation']",
            ".sidebar",
            "[class*='sidebar']",
            "[class*='cookie']",
            "[class*='banner']",
            "script",
            "style",
        ]
    }

    fn link_source(&self) -> LinkSource {
        LinkSource::Custom(discover_urls)
    }
}

/// Mintlify sidebars are rendered client-side from script payloads, so the
/// links are recovered from the scripts rather than from anchors.
///
/// Paths in the payload are relative to the app mount point. When the app is
/// served below a subpath, the mount prefix is inferred by matching a payload
/// path against the tail of the current page path.
pub fn discover_urls(html: &str, base_url: &Url) -> Vec<String> {
    let Ok(pattern) = Regex::new(HREF_PATTERN) else {
        return Vec::new();
    };
    let Ok(script_selector) = Selector::parse("script") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for script in document.select(&script_selector) {
        let text = script.text().collect::<String>();
        for captures in pattern.captures_iter(&text) {
            if let Some(path) = captures.get(1) {
                let path = path.as_str().to_string();
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
        }
    }

    let pathname = base_url.path();
    let mount_prefix = paths
        .iter()
        .filter(|path| pathname != path.as_str() && pathname.ends_with(path.as_str()))
        .map(|path| &pathname[..pathname.len() - path.len()])
        .max_by_key(|candidate| candidate.len())
        .unwrap_or("");

    let origin = base_url.origin().ascii_serialization();
    paths
        .iter()
        .map(|path| {
            if !mount_prefix.is_empty() && path.starts_with(mount_prefix) {
                format!("{}{}", origin, path)
            } else {
                format!("{}{}{}", origin, mount_prefix, path)
            }
        })
        .collect()
}
