use crate::extract::meta_content;
use scraper::{Html, Selector};
use url::Url;

/// Site-level metadata taken from the first crawled page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteMeta {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
}

const TITLE_SEPARATORS: [&str; 3] = [" | ", " - ", " – "];

pub fn extract_site_meta(html: &str, url: &Url) -> SiteMeta {
    let document = Html::parse_document(html);

    let display_name = meta_content(&document, r#"meta[property="og:site_name"]"#)
        .or_else(|| title_prefix(&document));
    let description = meta_content(&document, r#"meta[name="description"]"#)
        .or_else(|| meta_content(&document, r#"meta[property="og:description"]"#));
    let icon_url = icon_href(&document).and_then(|href| url.join(&href).ok().map(String::from));

    SiteMeta {
        display_name,
        description,
        icon_url,
    }
}

fn title_prefix(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?.text().collect::<String>();
    let title = title.trim();

    let cut = TITLE_SEPARATORS
        .iter()
        .filter_map(|separator| title.find(separator))
        .min()
        .unwrap_or(title.len());
    Some(title[..cut].trim().to_string()).filter(|name| !name.is_empty())
}

fn icon_href(document: &Html) -> Option<String> {
    let selector = Selector::parse("link[rel~='icon'][href]").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(str::to_string)
}
