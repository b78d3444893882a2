use std::collections::{HashMap, HashSet};

/// Drops boilerplate paragraphs from every page.
///
/// A paragraph is a blank-line separated block. Blocks found on more than
/// half of the pages (rounded up) are considered boilerplate. With zero or
/// one page there is nothing to compare and the input is returned as is.
pub fn deduplicate_sections(pages: &[String]) -> Vec<String> {
    if pages.len() <= 1 {
        return pages.to_vec();
    }

    let threshold = pages.len().div_ceil(2);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for page in pages {
        let unique: HashSet<String> = paragraphs(page).map(hash_paragraph).collect();
        for hash in unique {
            *counts.entry(hash).or_default() += 1;
        }
    }

    let boilerplate: HashSet<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > threshold)
        .map(|(hash, _)| hash)
        .collect();
    if boilerplate.is_empty() {
        return pages.to_vec();
    }
    tracing::debug!("Removing {} boilerplate paragraphs", boilerplate.len());

    pages
        .iter()
        .map(|page| {
            paragraphs(page)
                .filter(|paragraph| !boilerplate.contains(&hash_paragraph(paragraph)))
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .collect()
}

fn paragraphs(markdown: &str) -> impl Iterator<Item = &str> {
    markdown
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
}

fn hash_paragraph(paragraph: &str) -> String {
    format!("{:x}", md5::compute(paragraph.trim().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_removes_repeated_paragraphs() {
        let input = pages(&[
            "Was this helpful?\n\n# One\n\nFirst",
            "# Two\n\nSecond\n\nWas this helpful?",
            "# Three\n\n\n\nWas this helpful?",
        ]);
        assert_eq!(
            deduplicate_sections(&input),
            pages(&["# One\n\nFirst", "# Two\n\nSecond", "# Three"])
        );
    }

    #[test]
    fn test_keeps_paragraphs_on_half_of_pages() {
        let input = pages(&["Shared\n\nA", "Shared\n\nB", "C", "D"]);
        assert_eq!(deduplicate_sections(&input), input);
    }

    #[test]
    fn test_single_page_is_untouched() {
        let input = pages(&["Footer\n\nFooter"]);
        assert_eq!(deduplicate_sections(&input), input);
        assert!(deduplicate_sections(&[]).is_empty());
    }

    #[test]
    fn test_repeats_within_one_page_count_once() {
        let input = pages(&["X\n\nX\n\nX", "Y", "Z"]);
        assert_eq!(deduplicate_sections(&input), input);
    }
}
