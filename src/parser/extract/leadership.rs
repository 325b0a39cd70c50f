use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::Leader;
use crate::parser::text::{element_text, text_or_empty};

static NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".name").unwrap());
static STRONG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".title").unwrap());

pub fn extract(items: &[ElementRef<'_>]) -> Vec<Leader> {
    items
        .iter()
        .filter_map(|li| {
            let name = li
                .select(&NAME)
                .next()
                .map(|el| match el.select(&STRONG).next() {
                    Some(strong) => element_text(strong),
                    None => element_text(el),
                })
                .unwrap_or_default();
            if name.is_empty() {
                return None;
            }
            let title = text_or_empty(li.select(&TITLE).next());
            Some(Leader { name, title })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::test_support::{all, doc};

    const ITEMS: &str = ".sidebar-top ul li";

    #[test]
    fn strong_name_preferred() {
        let d = doc(r#"<aside class="sidebar-top"><ul>
            <li><div class="name"><strong>Ada Lovelace</strong> (she/her)</div>
                <div class="title">Chief Executive Officer</div></li>
            <li><div class="name">  Charles
                Babbage </div></li>
        </ul></aside>"#);
        let leaders = extract(&all(&d, ITEMS));
        assert_eq!(
            leaders,
            vec![
                Leader { name: "Ada Lovelace".into(), title: "Chief Executive Officer".into() },
                Leader { name: "Charles Babbage".into(), title: String::new() },
            ]
        );
    }

    #[test]
    fn nameless_entries_skipped() {
        let d = doc(r#"<div class="sidebar-top"><ul>
            <li><div class="title">Advisor</div></li>
            <li><div class="name"><strong> </strong></div><div class="title">CTO</div></li>
        </ul></div>"#);
        assert!(extract(&all(&d, ITEMS)).is_empty());
    }
}
