use super::{PlatformId, PlatformStrategy, matches_any};
use crate::discover::LinkSource;
use scraper::Html;
use url::Url;

pub struct Gitbook;

impl PlatformStrategy for Gitbook {
    fn id(&self) -> PlatformId {
        PlatformId::Gitbook
    }

    fn detect(&self, url: &Url, document: &Html) -> bool {
        url.host_str().is_some_and(|host| host.ends_with(".gitbook.io"))
            || matches_any(
                document,
                &[
                    r#"meta[name="generator"][content*="GitBook"]"#,
                    r#"[data-testid="page.contentEditor"]"#,
                ],
            )
    }

    fn content_selector(&self) -> &'static str {
        r#"[data-testid="page.contentEditor"], main, article"#
    }

    fn remove_selectors(&self) -> &'static [&'static str] {
        &[
            "nav",
            "header",
            "footer",
            "[class*='sidebar']",
            "[class*='toc']",
            "[class*='cookie']",
            "script",
            "style",
        ]
    }

    fn link_source(&self) -> LinkSource {
        LinkSource::Navigation("nav a[href]".to_string())
    }
}
