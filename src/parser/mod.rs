pub mod extract;
pub mod text;

use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error};

use crate::db::{InputRecord, OutputRecord};
use crate::error::ParseError;
use extract::ParsedRecord;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static TECH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#tech").unwrap());
static EMAIL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#email").unwrap());
static FAQ: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#faq").unwrap());
static OVERVIEW_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".highlight-left dl .item").unwrap());
static LEADERSHIP_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".sidebar-top ul li").unwrap());
static HERO_PRE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".hero pre").unwrap());

/// Page regions located once per document and shared by the extractors.
struct Regions<'a> {
    tech: Option<ElementRef<'a>>,
    email: Option<ElementRef<'a>>,
    faq: Option<ElementRef<'a>>,
    overview_items: Vec<ElementRef<'a>>,
    leadership_items: Vec<ElementRef<'a>>,
    hero_pre: Option<ElementRef<'a>>,
}

impl<'a> Regions<'a> {
    fn locate(document: &'a Html) -> Self {
        Regions {
            tech: document.select(&TECH).next(),
            email: document.select(&EMAIL).next(),
            faq: document.select(&FAQ).next(),
            overview_items: document.select(&OVERVIEW_ITEMS).collect(),
            leadership_items: document.select(&LEADERSHIP_ITEMS).collect(),
            hero_pre: document.select(&HERO_PRE).next(),
        }
    }
}

/// Parse one HTML page into a profile: tree once, regions once, then every extractor.
pub fn parse_document(html: &str) -> ParsedRecord {
    let document = Html::parse_document(html);

    let title = text::text_or_empty(document.select(&TITLE).next());
    let meta_description = document
        .select(&META_DESCRIPTION)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    let regions = Regions::locate(&document);

    ParsedRecord {
        title,
        meta_description,
        overview: extract::overview::extract(&regions.overview_items),
        tech_stack: extract::tech::extract(regions.tech),
        email_formats: extract::email::extract(regions.email),
        faq: extract::faq::extract(regions.faq),
        leadership: extract::leadership::extract(&regions.leadership_items),
        social_links: extract::links::extract(&document),
        description: extract::description::extract(regions.hero_pre),
    }
}

/// Parse a stored page, isolating any panic inside tree building or extraction.
pub fn try_parse(record: &InputRecord) -> Result<ParsedRecord, ParseError> {
    guarded(record, parse_document)
}

fn guarded<P>(record: &InputRecord, parse: P) -> Result<ParsedRecord, ParseError>
where
    P: Fn(&str) -> ParsedRecord,
{
    let html = record
        .html
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or(ParseError::MissingInput)?;

    panic::catch_unwind(AssertUnwindSafe(|| parse(html)))
        .map_err(|payload| ParseError::Failed(panic_message(payload.as_ref())))
}

/// Worker entry point: one input record in, an output record or a logged skip out.
pub fn process_record(record: &InputRecord) -> Option<OutputRecord> {
    process_with(record, parse_document)
}

pub(crate) fn process_with<P>(record: &InputRecord, parse: P) -> Option<OutputRecord>
where
    P: Fn(&str) -> ParsedRecord,
{
    match guarded(record, parse) {
        Ok(parsed) => Some(OutputRecord::from_input(record, parsed)),
        Err(ParseError::MissingInput) => {
            debug!(company_id = %record.company_id, "no html, skipping");
            None
        }
        Err(err) => {
            error!(company_id = %record.company_id, error = %err, "Parse failed for doc");
            None
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}


// ── Tests ──
