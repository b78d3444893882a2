use super::{PlatformId, PlatformStrategy, matches_any};
use crate::discover::LinkSource;
use scraper::{Html, Selector};
use url::Url;

pub struct Readme;

fn rm_class_count(document: &Html) -> usize {
    let Ok(selector) = Selector::parse("[class]") else {
        return 0;
    };
    document
        .select(&selector)
        .filter(|element| element.value().classes().any(|c| c.starts_with("rm-")))
        .count()
}

impl PlatformStrategy for Readme {
    fn id(&self) -> PlatformId {
        PlatformId::Readme
    }

    fn detect(&self, _url: &Url, document: &Html) -> bool {
        rm_class_count(document) > 2 || matches_any(document, &[".rm-Article", ".rm-Markdown"])
    }

    fn content_selector(&self) -> &'static str {
        ".markdown-body, .rm-Article, .rm-Markdown"
    }

    fn remove_selectors(&self) -> &'static [&'static str] {
        &[
            "nav",
            "header",
            "footer",
            ".rm-Sidebar",
            ".rm-TableOfContents",
            "[class*='cookie']",
            "script",
            "style",
        ]
    }

    fn link_source(&self) -> LinkSource {
        LinkSource::Navigation(".rm-Sidebar a[href]".to_string())
    }
}
