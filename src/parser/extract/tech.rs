use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::TechEntry;
use crate::parser::text::text_or_empty;

static LI: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".name").unwrap());
static CATEGORY: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".category").unwrap());

pub fn extract(region: Option<ElementRef<'_>>) -> Vec<TechEntry> {
    let Some(region) = region else {
        return Vec::new();
    };

    region
        .select(&LI)
        .filter_map(|li| {
            let name = text_or_empty(li.select(&NAME).next());
            if name.is_empty() {
                return None;
            }
            let category = text_or_empty(li.select(&CATEGORY).next());
            Some(TechEntry { name, category })
        })
        .collect()
}
