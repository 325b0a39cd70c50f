use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::EmailFormat;
use crate::parser::text::element_text;

static TBODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody").unwrap());
static BODY_TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());
static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Rows of the email-format tables. Body rows of every table win over header
/// rows; without any `tbody` every row in the region counts.
///
/// html5ever wraps bare `tr` rows in a `tbody`, so tables written without one
/// still go through the body-row path.
pub fn extract(region: Option<ElementRef<'_>>) -> Vec<EmailFormat> {
    let Some(region) = region else {
        return Vec::new();
    };
    let rows_sel: &Selector = if region.select(&TBODY).next().is_some() {
        &BODY_TR
    } else {
        &TR
    };

    let mut formats = Vec::new();
    for row in region.select(rows_sel) {
        let cells: Vec<ElementRef<'_>> = row.select(&TD).take(3).collect();
        if let [pattern, example, percentage] = cells[..] {
            formats.push(EmailFormat {
                pattern: element_text(pattern),
                example: element_text(example),
                percentage: element_text(percentage),
            });
        }
    }
    formats
}
