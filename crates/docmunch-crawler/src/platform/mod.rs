//! Documentation platform strategies.
//!
//! Each supported platform knows how to recognise its own pages, where the
//! article content lives, which chrome to strip, and how its navigation links
//! are exposed. Detection runs in registry order and `generic` always matches.

mod docusaurus;
mod generic;
mod gitbook;
mod mintlify;
mod readme;

use crate::discover::LinkSource;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

pub use docusaurus::Docusaurus;
pub use generic::Generic;
pub use gitbook::Gitbook;
pub use mintlify::Mintlify;
pub use readme::Readme;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlatformId {
    Mintlify,
    Docusaurus,
    Readme,
    Gitbook,
    #[default]
    Generic,
}

pub trait PlatformStrategy: Send + Sync {
    fn id(&self) -> PlatformId;

    /// Whether this strategy applies to the page.
    fn detect(&self, url: &Url, document: &Html) -> bool;

    /// Selector for the main content container.
    fn content_selector(&self) -> &'static str;

    /// Selectors for chrome removed before extraction.
    fn remove_selectors(&self) -> &'static [&'static str];

    /// How navigation links are discovered in crawl mode.
    fn link_source(&self) -> LinkSource;
}

static STRATEGIES: [&dyn PlatformStrategy; 5] =
    [&Mintlify, &Docusaurus, &Readme, &Gitbook, &Generic];

/// Registered strategies in detection order.
pub fn strategies() -> &'static [&'static dyn PlatformStrategy] {
    &STRATEGIES
}

pub fn strategy(id: PlatformId) -> &'static dyn PlatformStrategy {
    STRATEGIES
        .iter()
        .copied()
        .find(|strategy| strategy.id() == id)
        .unwrap_or(&Generic)
}

/// Detects which platform a parsed page belongs to.
pub fn resolve(url: &Url, document: &Html) -> PlatformId {
    STRATEGIES
        .iter()
        .find(|strategy| strategy.detect(url, document))
        .map(|strategy| strategy.id())
        .unwrap_or_default()
}

/// Convenience wrapper over [`resolve`] for raw markup.
pub fn resolve_html(url: &Url, html: &str) -> PlatformId {
    resolve(url, &Html::parse_document(html))
}

pub(crate) fn matches_any(document: &Html, selectors: &[&str]) -> bool {
    selectors.iter().any(|selector| match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    })
}
