use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};

static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

const PLATFORMS: &[(&str, &str)] = &[("linkedin", "linkedin.com")];

/// Social profile links keyed by platform. The last matching anchor in document order wins.
pub fn extract(document: &Html) -> BTreeMap<String, String> {
    let mut links = BTreeMap::new();
    for href in document.select(&ANCHORS).filter_map(|a| a.value().attr("href")) {
        for (platform, needle) in PLATFORMS {
            if href.contains(needle) {
                links.insert(platform.to_string(), href.to_string());
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::test_support::doc;

    #[test]
    fn last_linkedin_wins() {
        let d = doc(r#"
            <a href="https://www.linkedin.com/company/acme-old">old</a>
            <a href="https://twitter.com/acme">tw</a>
            <footer><a href="https://linkedin.com/company/acme">in</a></footer>
        "#);
        let links = extract(&d);
        assert_eq!(links.len(), 1);
        assert_eq!(links["linkedin"], "https://linkedin.com/company/acme");
    }

    #[test]
    fn anchors_without_href_ignored() {
        let d = doc(r#"<a name="linkedin.com">anchor</a><a href="/about">about</a>"#);
        assert!(extract(&d).is_empty());
    }
}
