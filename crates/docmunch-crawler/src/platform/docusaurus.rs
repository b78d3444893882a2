use super::{PlatformId, PlatformStrategy, matches_any};
use crate::discover::LinkSource;
use scraper::Html;
use url::Url;

pub struct Docusaurus;

impl PlatformStrategy for Docusaurus {
    fn id(&self) -> PlatformId {
        PlatformId::Docusaurus
    }

    fn detect(&self, _url: &Url, document: &Html) -> bool {
        matches_any(
            document,
            &[
                r#"meta[name="generator"][content*="Docusaurus"]"#,
                ".theme-doc-sidebar-container",
                r#"meta[name="docusaurus_locale"]"#,
            ],
        )
    }

    fn content_selector(&self) -> &'static str {
        "article, [role='main'], .theme-doc-markdown"
    }

    fn remove_selectors(&self) -> &'static [&'static str] {
        &[
            ".navbar",
            "footer",
            ".theme-doc-toc-desktop",
            ".theme-doc-sidebar-container",
            ".pagination-nav",
            ".theme-doc-breadcrumbs",
            "nav",
            "script",
            "style",
        ]
    }

    fn link_source(&self) -> LinkSource {
        LinkSource::Navigation(".menu__link[href]".to_string())
    }
}
