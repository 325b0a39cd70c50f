use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, WriteFailure};
use crate::parser::extract::ParsedRecord;

/// Open an existing store read-only. Never creates the file.
pub fn connect_input(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open input store {:?}", path))?;
    Ok(conn)
}

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Failed to open store {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_input_schema(conn: &Connection, table: &str) -> Result<(), StoreError> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            company_id    TEXT NOT NULL,
            company_name  TEXT,
            main_url      TEXT,
            related_urls  TEXT,
            scraped_at    TEXT,
            scraped_data  TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_company ON {table}(company_id);
        "
    ))?;
    Ok(())
}

pub fn init_output_schema(conn: &Connection, table: &str) -> Result<(), StoreError> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            company_id    TEXT PRIMARY KEY,
            company_name  TEXT,
            main_url      TEXT,
            related_urls  TEXT NOT NULL DEFAULT '[]',
            scraped_at    TEXT,
            parsed_data   TEXT NOT NULL,
            inserted_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "
    ))?;
    Ok(())
}

// ── Reading ──

/// A captured company page, projected down to what the parser needs.
#[derive(Debug, Clone)]
pub struct InputRecord {
    pub company_id: String,
    pub company_name: Option<String>,
    pub main_url: Option<String>,
    pub related_urls: Vec<String>,
    pub scraped_at: Option<String>,
    pub html: Option<String>,
}

/// Streams input records in pages of at most `page_size`, keyed on rowid.
///
/// Each page is its own bounded query, so nothing is held open between pages.
/// The reader is single-pass: once exhausted it stays exhausted.
pub struct PageReader<'c> {
    conn: &'c Connection,
    sql: String,
    page_size: usize,
    remaining: Option<usize>,
    last_rowid: i64,
    done: bool,
}

impl<'c> PageReader<'c> {
    pub fn new(conn: &'c Connection, table: &str, page_size: usize, limit: Option<usize>) -> Self {
        let sql = format!(
            "SELECT rowid,
                    COALESCE(CAST(company_id AS TEXT), ''),
                    CAST(company_name AS TEXT),
                    CAST(main_url AS TEXT),
                    CAST(related_urls AS TEXT),
                    CAST(scraped_at AS TEXT),
                    CASE WHEN json_valid(scraped_data) THEN
                        CASE WHEN json_type(scraped_data, '$.html_content') = 'text'
                             THEN json_extract(scraped_data, '$.html_content') END
                    END
             FROM {table}
             WHERE rowid > ?1
             ORDER BY rowid
             LIMIT ?2"
        );
        PageReader {
            conn,
            sql,
            page_size: page_size.max(1),
            remaining: limit,
            last_rowid: 0,
            done: false,
        }
    }

    fn fetch_page(&mut self, want: usize) -> Result<Vec<InputRecord>, StoreError> {
        let mut stmt = self.conn.prepare_cached(&self.sql)?;
        let rows = stmt
            .query_map(params![self.last_rowid, want as i64], |row| {
                let related: Option<String> = row.get(4)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    InputRecord {
                        company_id: row.get(1)?,
                        company_name: row.get(2)?,
                        main_url: row.get(3)?,
                        related_urls: parse_urls(related.as_deref()),
                        scraped_at: row.get(5)?,
                        html: row.get(6)?,
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if let Some((rowid, _)) = rows.last() {
            self.last_rowid = *rowid;
        }
        Ok(rows.into_iter().map(|(_, record)| record).collect())
    }
}

impl Iterator for PageReader<'_> {
    type Item = Result<Vec<InputRecord>, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let want = self
            .remaining
            .map_or(self.page_size, |left| left.min(self.page_size));
        if want == 0 {
            self.done = true;
            return None;
        }

        match self.fetch_page(want) {
            Ok(page) if page.is_empty() => {
                self.done = true;
                None
            }
            Ok(page) => {
                if page.len() < want {
                    self.done = true;
                }
                if let Some(left) = self.remaining.as_mut() {
                    *left -= page.len();
                }
                Some(Ok(page))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Related URLs are stored as a JSON array; anything else reads as empty.
fn parse_urls(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|text| serde_json::from_str::<Vec<serde_json::Value>>(text).ok())
        .map(|values| {
            values
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ── Writing ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub company_id: String,
    pub company_name: Option<String>,
    pub main_url: Option<String>,
    pub related_urls: Vec<String>,
    pub scraped_at: Option<String>,
    pub parsed_data: ParsedRecord,
}

impl OutputRecord {
    pub fn from_input(input: &InputRecord, parsed_data: ParsedRecord) -> Self {
        OutputRecord {
            company_id: input.company_id.clone(),
            company_name: input.company_name.clone(),
            main_url: input.main_url.clone(),
            related_urls: input.related_urls.clone(),
            scraped_at: input.scraped_at.clone(),
            parsed_data,
        }
    }
}

/// Insert every record independently inside one transaction.
///
/// A rejected record does not stop its siblings; the successful ones are
/// committed and the rejections come back as `StoreError::BulkWrite`.
pub fn insert_unordered(
    conn: &Connection,
    table: &str,
    records: &[OutputRecord],
) -> Result<(), StoreError> {
    let tx = conn.unchecked_transaction()?;
    let mut failures = Vec::new();
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {table}
             (company_id, company_name, main_url, related_urls, scraped_at, parsed_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        ))?;
        for (index, r) in records.iter().enumerate() {
            let related = serde_json::to_string(&r.related_urls)?;
            let parsed = serde_json::to_string(&r.parsed_data)?;
            let result = stmt.execute(params![
                r.company_id, r.company_name, r.main_url, related, r.scraped_at, parsed,
            ]);
            if let Err(err) = result {
                failures.push(WriteFailure {
                    index,
                    company_id: r.company_id.clone(),
                    duplicate_key: is_duplicate_key(&err),
                    message: err.to_string(),
                });
            }
        }
    }
    tx.commit()?;

    if failures.is_empty() {
        Ok(())
    } else {
        Err(StoreError::BulkWrite(failures))
    }
}

fn is_duplicate_key(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub fn fetch_output(
    conn: &Connection,
    table: &str,
    company_id: &str,
) -> Result<Option<OutputRecord>, StoreError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT company_id, company_name, main_url, related_urls, scraped_at, parsed_data
                 FROM {table} WHERE company_id = ?1"
            ),
            params![company_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((company_id, company_name, main_url, related, scraped_at, parsed)) = row else {
        return Ok(None);
    };
    Ok(Some(OutputRecord {
        company_id,
        company_name,
        main_url,
        related_urls: serde_json::from_str(&related)?,
        scraped_at,
        parsed_data: serde_json::from_str(&parsed)?,
    }))
}

// ── Stats ──

pub struct Stats {
    pub input_total: usize,
    pub input_with_html: usize,
    pub output_total: usize,
}

pub fn get_stats(
    input: &Connection,
    input_table: &str,
    output: &Connection,
    output_table: &str,
) -> Result<Stats, StoreError> {
    let input_total: usize =
        input.query_row(&format!("SELECT COUNT(*) FROM {input_table}"), [], |r| r.get(0))?;
    let input_with_html: usize = input.query_row(
        &format!(
            "SELECT COUNT(*) FROM {input_table}
             WHERE CASE WHEN json_valid(scraped_data) THEN
                       json_type(scraped_data, '$.html_content') = 'text'
                       AND json_extract(scraped_data, '$.html_content') != ''
                   ELSE 0 END"
        ),
        [],
        |r| r.get(0),
    )?;
    let output_total = count_rows(output, output_table)?;
    Ok(Stats {
        input_total,
        input_with_html,
        output_total,
    })
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<usize, StoreError> {
    let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
    Ok(n)
}

// ── Tests ──
