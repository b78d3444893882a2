use crate::dedup::deduplicate_sections;
use crate::extract::extract;
use crate::transform::transform;
use docmunch_crawler::{CrawledPage, PlatformId};
use url::Url;

/// A crawled page converted to Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub url: Url,
    pub title: String,
    pub platform: PlatformId,
    pub markdown: String,
}

pub fn render_page(page: &CrawledPage) -> RenderedPage {
    let extracted = extract(&page.html, &page.url);
    RenderedPage {
        url: page.url.clone(),
        title: extracted.title,
        platform: extracted.platform,
        markdown: transform(&extracted.content),
    }
}

pub fn render_pages(pages: &[CrawledPage]) -> Vec<RenderedPage> {
    pages.iter().map(render_page).collect()
}

/// Joins pages into one document, each under its own heading. Paragraphs
/// repeated across most pages are boilerplate and dropped.
pub fn stitch(pages: &[RenderedPage]) -> String {
    let markdown: Vec<String> = pages.iter().map(|page| page.markdown.clone()).collect();
    pages
        .iter()
        .zip(deduplicate_sections(&markdown))
        .map(|(page, markdown)| format!("## {}\n\nSource: {}\n\n{}", page.title, page.url, markdown))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawled(url: &str, body: &str) -> CrawledPage {
        CrawledPage {
            url: Url::parse(url).unwrap(),
            html: format!("<html><body><main>{}</main></body></html>", body),
        }
    }

    #[test]
    fn test_render_pages_keeps_shared_paragraphs() {
        let pages = vec![
            crawled("https://x.com/docs/a", "<h1>A</h1><p>Alpha</p><p>Edit this page</p>"),
            crawled("https://x.com/docs/b", "<h1>B</h1><p>Beta</p><p>Edit this page</p>"),
            crawled("https://x.com/docs/c", "<h1>C</h1><p>Gamma</p><p>Edit this page</p>"),
        ];
        let rendered = render_pages(&pages);

        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered[0].title, "A");
        assert_eq!(rendered[1].platform, PlatformId::Generic);
        assert!(rendered[2].markdown.contains("Gamma"));
        assert!(rendered.iter().all(|page| page.markdown.contains("Edit this page")));
    }

    #[test]
    fn test_stitch_drops_boilerplate() {
        let pages = vec![
            crawled("https://x.com/docs/a", "<h1>A</h1><p>Alpha</p><p>Edit this page</p>"),
            crawled("https://x.com/docs/b", "<h1>B</h1><p>Beta</p><p>Edit this page</p>"),
            crawled("https://x.com/docs/c", "<h1>C</h1><p>Gamma</p><p>Edit this page</p>"),
        ];
        let stitched = stitch(&render_pages(&pages));

        assert!(stitched.contains("Alpha"));
        assert!(stitched.contains("Gamma"));
        assert!(!stitched.contains("Edit this page"));
    }

    #[test]
    fn test_stitch_format() {
        let pages = vec![
            RenderedPage {
                url: Url::parse("https://x.com/docs/a").unwrap(),
                title: "A".to_string(),
                platform: PlatformId::Generic,
                markdown: "Alpha".to_string(),
            },
            RenderedPage {
                url: Url::parse("https://x.com/docs/b").unwrap(),
                title: "B".to_string(),
                platform: PlatformId::Generic,
                markdown: "Beta".to_string(),
            },
        ];
        assert_eq!(
            stitch(&pages),
            "## A\n\nSource: https://x.com/docs/a\n\nAlpha\n\n---\n\n## B\n\nSource: https://x.com/docs/b\n\nBeta"
        );
    }

    #[test]
    fn test_stitch_empty() {
        assert_eq!(stitch(&[]), "");
    }
}
