use scraper::{ElementRef, Html, Selector};

/// Converts extracted content HTML to Markdown.
pub fn transform(html: &str) -> String {
    let cleaned = strip_hidden(html);
    html2md::parse_html(&cleaned).trim().to_string()
}

/// Removes `display:none` elements. Tab panels are kept because inactive
/// tabs are hidden but still carry documentation.
fn strip_hidden(html: &str) -> String {
    let mut fragment = Html::parse_fragment(html);
    let Ok(styled) = Selector::parse("[style]") else {
        return html.to_string();
    };

    let hidden: Vec<_> = fragment
        .select(&styled)
        .filter(|element| is_hidden(element) && !is_tab_panel(element))
        .map(|element| element.id())
        .collect();
    if hidden.is_empty() {
        return html.to_string();
    }

    for id in hidden {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }
    fragment.root_element().inner_html()
}

fn is_hidden(element: &ElementRef) -> bool {
    element.value().attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none")
    })
}

fn is_tab_panel(element: &ElementRef) -> bool {
    element.value().attr("role") == Some("tabpanel")
        || element
            .value()
            .classes()
            .any(|class| class.eq_ignore_ascii_case("tab-panel") || class.eq_ignore_ascii_case("tabpanel"))
}
