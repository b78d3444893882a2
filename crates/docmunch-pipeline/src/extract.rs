use docmunch_crawler::platform::{self, PlatformId, PlatformStrategy};
use scraper::{Html, Selector};
use url::Url;

/// Selector content shorter than this is treated as a failed match.
const MIN_CONTENT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Inner HTML of the main content container.
    pub content: String,
    pub title: String,
    pub platform: PlatformId,
}

/// Extracts the article HTML and title of a documentation page.
///
/// Detected platforms use their own content selector first. Anything that
/// yields too little falls back to the generic selectors, then `<body>`,
/// then the raw input.
pub fn extract(html: &str, url: &Url) -> Extracted {
    let document = Html::parse_document(html);
    let platform = platform::resolve(url, &document);
    let title = extract_title(&document);

    if platform != PlatformId::Generic {
        let strategy = platform::strategy(platform);
        if let Some(content) = select_content(html, strategy)
            .filter(|content| visible_chars(content) >= MIN_CONTENT_CHARS)
        {
            return Extracted {
                content,
                title,
                platform,
            };
        }
        tracing::debug!(
            "{} selectors yielded too little content on {}, falling back",
            platform,
            url
        );
    }

    let generic = platform::strategy(PlatformId::Generic);
    let content = select_content(html, generic)
        .filter(|content| !content.trim().is_empty())
        .or_else(|| body_html(html, generic))
        .unwrap_or_else(|| html.to_string());

    Extracted {
        content,
        title,
        platform,
    }
}

/// Page title from the first `<h1>`, then `og:title`, then `<title>`.
pub fn extract_title(document: &Html) -> String {
    first_text(document, "h1")
        .or_else(|| meta_content(document, r#"meta[property="og:title"]"#))
        .or_else(|| first_text(document, "title"))
        .unwrap_or_default()
}

fn select_content(html: &str, strategy: &dyn PlatformStrategy) -> Option<String> {
    let mut document = Html::parse_document(html);
    remove_matching(&mut document, strategy.remove_selectors());

    let selector = Selector::parse(strategy.content_selector()).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.inner_html())
}

/// Detaches every element matching any of `selectors`.
pub(crate) fn remove_matching(document: &mut Html, selectors: &[&str]) {
    for selector in selectors {
        let Ok(parsed) = Selector::parse(selector) else {
            tracing::warn!("Invalid remove selector '{}'", selector);
            continue;
        };
        let ids: Vec<_> = document.select(&parsed).map(|element| element.id()).collect();
        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// `<body>` with the strategy's chrome removed.
fn body_html(html: &str, strategy: &dyn PlatformStrategy) -> Option<String> {
    let mut document = Html::parse_document(html);
    remove_matching(&mut document, strategy.remove_selectors());

    let selector = Selector::parse("body").ok()?;
    document
        .select(&selector)
        .next()
        .map(|body| body.inner_html())
        .filter(|content| !content.trim().is_empty())
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

pub(crate) fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

fn visible_chars(content: &str) -> usize {
    content.chars().filter(|c| !c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn url() -> Url {
        Url::parse("https://docs.example.com/guide/intro").unwrap()
    }

    fn long_text() -> String {
        "Documentation content that is long enough to pass the threshold. ".repeat(3)
    }

    #[rstest]
    #[case("<html><head><title>Page</title></head><body><h1> Heading </h1></body></html>", "Heading")]
    #[case(r#"<html><head><title>Page</title><meta property="og:title" content="OG Title"></head><body></body></html>"#, "OG Title")]
    #[case("<html><head><title> Page | Site </title></head><body></body></html>", "Page | Site")]
    #[case("<html><body><p>none</p></body></html>", "")]
    fn test_extract_title(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(extract_title(&Html::parse_document(html)), expected);
    }

    #[test]
    fn test_docusaurus_uses_platform_selector() {
        let html = format!(
            r#"<html><head><meta name="generator" content="Docusaurus v3"></head><body>
                <nav class="navbar"><a href="/">Home</a></nav>
                <div class="theme-doc-markdown"><h1>Intro</h1><p>{}</p></div>
                <footer>Footer</footer></body></html>"#,
            long_text()
        );
        let extracted = extract(&html, &url());

        assert_eq!(extracted.platform, PlatformId::Docusaurus);
        assert_eq!(extracted.title, "Intro");
        assert!(extracted.content.contains("long enough"));
        assert!(!extracted.content.contains("Footer"));
    }

    #[test]
    fn test_thin_platform_content_falls_back_to_generic() {
        let html = format!(
            r#"<html><head><meta name="generator" content="Docusaurus v3"></head><body>
                <div class="theme-doc-markdown">stub</div>
                <div class="content"><p>{}</p></div></body></html>"#,
            long_text()
        );
        let extracted = extract(&html, &url());

        assert_eq!(extracted.platform, PlatformId::Docusaurus);
        assert!(extracted.content.contains("long enough"));
        assert!(!extracted.content.contains("stub"));
    }

    #[test]
    fn test_generic_strips_chrome() {
        let html = r#"<html><body>
            <header>Site header</header>
            <main><h1>Title</h1><p>Body text</p><script>track()</script></main>
            </body></html>"#;
        let extracted = extract(html, &url());

        assert_eq!(extracted.platform, PlatformId::Generic);
        assert!(extracted.content.contains("Body text"));
        assert!(!extracted.content.contains("track()"));
        assert!(!extracted.content.contains("Site header"));
    }

    #[test]
    fn test_falls_back_to_body() {
        let html = "<html><body><div><p>Loose content</p></div></body></html>";
        let extracted = extract(html, &url());
        assert!(extracted.content.contains("Loose content"));
    }

    #[test]
    fn test_body_fallback_strips_chrome() {
        let html = r#"<html><body>
            <header>Site header</header>
            <nav><a href="/a">A</a></nav>
            <div><p>Real documentation without a content container.</p></div>
            <footer>Footer text</footer>
            <script>var tracking = 1;</script>
            </body></html>"#;
        let extracted = extract(html, &url());

        assert!(extracted.content.contains("Real documentation"));
        assert!(!extracted.content.contains("Site header"));
        assert!(!extracted.content.contains("Footer text"));
        assert!(!extracted.content.contains("tracking"));
    }

    #[test]
    fn test_empty_document_returns_raw_input() {
        let extracted = extract("", &url());
        assert_eq!(extracted.content, "");
        assert_eq!(extracted.title, "");
    }
}
