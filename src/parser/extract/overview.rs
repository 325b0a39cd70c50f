use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::parser::text::element_text;

static DT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dt").unwrap());
static DD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dd").unwrap());

/// Label/value pairs from the overview `dl` items. Later labels overwrite earlier ones.
pub fn extract(items: &[ElementRef<'_>]) -> BTreeMap<String, String> {
    let mut overview = BTreeMap::new();
    for item in items {
        let (Some(dt), Some(dd)) = (item.select(&DT).next(), item.select(&DD).next()) else {
            continue;
        };
        overview.insert(element_text(dt), element_text(dd));
    }
    overview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::test_support::{all, doc};

    const ITEMS: &str = ".highlight-left dl .item";

    #[test]
    fn single_pair() {
        let d = doc(r#"<div class="highlight-left"><dl>
            <div class="item"><dt>Founded</dt><dd> 2001 </dd></div>
        </dl></div>"#);
        let map = extract(&all(&d, ITEMS));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Founded").map(String::as_str), Some("2001"));
    }

    #[test]
    fn skips_items_missing_a_side_and_last_label_wins() {
        let d = doc(r#"<div class="highlight-left"><dl>
            <div class="item"><dt>Size</dt><dd>10</dd></div>
            <div class="item"><dt>Orphan</dt></div>
            <div class="item"><dd>no label</dd></div>
            <div class="item"><dt>Size</dt><dd>51 -
               200</dd></div>
        </dl></div>"#);
        let map = extract(&all(&d, ITEMS));
        assert_eq!(map.len(), 1);
        assert_eq!(map["Size"], "51 - 200");
    }

    #[test]
    fn no_region() {
        let d = doc("<p>nothing here</p>");
        assert!(extract(&all(&d, ITEMS)).is_empty());
    }
}
