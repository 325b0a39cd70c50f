use scraper::ElementRef;

use crate::parser::text::text_or_empty;

pub fn extract(hero_pre: Option<ElementRef<'_>>) -> String {
    text_or_empty(hero_pre)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::test_support::{doc, first};

    #[test]
    fn hero_pre_text() {
        let d = doc("<div class=\"hero\"><pre>Acme builds\n\n   rockets.</pre></div><pre>other</pre>");
        assert_eq!(extract(first(&d, ".hero pre")), "Acme builds rockets.");
        assert_eq!(extract(first(&d, ".missing pre")), "");
    }
}
