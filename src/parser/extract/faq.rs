use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::FaqEntry;
use crate::parser::text::{element_text, normalize, text_or_empty};

static DETAILS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("details").unwrap());
static SUMMARY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("summary").unwrap());

/// Question/answer pairs from collapsible `details` blocks.
///
/// The answer is the whole block text with the question removed, so a question
/// repeated inside its own answer is removed there too.
pub fn extract(region: Option<ElementRef<'_>>) -> Vec<FaqEntry> {
    let Some(region) = region else {
        return Vec::new();
    };

    region
        .select(&DETAILS)
        .filter_map(|block| {
            let question = text_or_empty(block.select(&SUMMARY).next());
            if question.is_empty() {
                return None;
            }
            let answer = normalize(&element_text(block).replace(&question, ""));
            Some(FaqEntry { question, answer })
        })
        .collect()
}
