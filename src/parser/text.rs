use itertools::Itertools;
use scraper::ElementRef;

/// Trim and collapse every whitespace run to a single space.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace().join(" ")
}

/// Text of all descendant text nodes, space-joined, then normalized.
pub fn element_text(el: ElementRef<'_>) -> String {
    normalize(&el.text().join(" "))
}

pub fn text_or_empty(el: Option<ElementRef<'_>>) -> String {
    el.map(element_text).unwrap_or_default()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn collapses_interior_runs() {
        assert_eq!(normalize("  Acme \n\t Corp  "), "Acme Corp");
        assert_eq!(normalize("one"), "one");
    }

    #[test]
    fn empty_and_absent() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n "), "");
    }

    #[test]
    fn element_text_joins_nodes() {
        let doc = Html::parse_fragment("<p>Series<b>B</b>\n  funded</p>");
        let p = Selector::parse("p").unwrap();
        let el = doc.select(&p).next();
        assert_eq!(text_or_empty(el), "Series B funded");
        assert_eq!(text_or_empty(None), "");
    }
}
