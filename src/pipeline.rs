use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::info;

use crate::settings::Settings;
use crate::db::{self, OutputRecord, PageReader};
use crate::dispatch::Dispatcher;
use crate::parser;
use crate::writer;

/// Totals for one ETL run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub read: usize,
    pub skipped: usize,
    /// Records handed to the writer, duplicates included.
    pub inserted: usize,
    pub elapsed: Duration,
}

/// Read → parse → write, one page at a time.
///
/// A page is fully parsed and written before the next page is read. Parse
/// failures only drop their own record; a non-duplicate write failure aborts
/// the run.
pub fn run(
    input: &Connection,
    output: &Connection,
    settings: &Settings,
    limit: Option<usize>,
) -> Result<RunSummary> {
    info!("Starting ETL job...");
    let start = Instant::now();

    db::init_output_schema(output, &settings.output_table)?;
    let dispatcher = Dispatcher::new(settings.workers, settings.chunk_size)
        .context("Failed to build worker pool")?;
    info!(workers = dispatcher.workers(), page_size = settings.read_batch_size, "pool ready");

    let available = db::count_rows(input, &settings.input_table)?;
    let pb = ProgressBar::new(limit.map_or(available, |n| n.min(available)) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut summary = RunSummary::default();
    let reader = PageReader::new(input, &settings.input_table, settings.read_batch_size, limit);
    for page in reader {
        let page = page.context("Failed to read input page")?;

        let results = dispatcher.map(&page, parser::process_record);
        let final_docs: Vec<OutputRecord> = results.into_iter().flatten().collect();

        writer::write_groups(
            output,
            &settings.output_table,
            &final_docs,
            settings.insert_batch_size,
        )
        .context("Bulk insert failed")?;

        summary.read += page.len();
        summary.skipped += page.len() - final_docs.len();
        summary.inserted += final_docs.len();
        pb.inc(page.len() as u64);
        info!("Inserted {} documents so far.", summary.inserted);
    }
    pb.finish_and_clear();

    summary.elapsed = start.elapsed();
    info!(
        read = summary.read,
        skipped = summary.skipped,
        "Completed. Total inserted: {}",
        summary.inserted
    );
    info!("Time taken: {:.2} seconds", summary.elapsed.as_secs_f64());
    Ok(summary)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::*;
    use crate::parser::fixtures::fixture;

    fn settings(read: usize, insert: usize, workers: usize) -> Settings {
        Settings {
            read_batch_size: read,
            insert_batch_size: insert,
            workers,
            chunk_size: 2,
            ..Settings::default()
        }
    }

    #[test]
    fn two_pages_full_then_partial() {
        let (input, output) = memory_stores();
        let html = fixture("acme");
        seed(&input, "c0", Some(&html));
        seed(&input, "c1", None);
        seed(&input, "c2", Some(&html));
        seed(&input, "c3", Some(&html));
        seed(&input, "c4", Some(""));
        seed(&input, "c5", Some(&html));
        seed(&input, "c6", Some("<html><title>Tiny</title></html>"));

        // pages of 4 then 3, write groups of 2
        let summary = run(&input, &output, &settings(4, 2, 3), None).unwrap();
        assert_eq!(summary.read, 7);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.inserted, 5);
        assert_eq!(count_rows(&output), 5);

        let tiny = db::fetch_output(&output, OUTPUT, "c6").unwrap().unwrap();
        assert_eq!(tiny.parsed_data.title, "Tiny");
        assert_eq!(tiny.related_urls, vec!["https://c6.example.com/jobs"]);
        assert!(db::fetch_output(&output, OUTPUT, "c1").unwrap().is_none());
    }

    #[test]
    fn rerun_swallows_duplicates() {
        let (input, output) = memory_stores();
        let html = fixture("acme");
        for i in 0..5 {
            seed(&input, &format!("c{}", i), Some(&html));
        }
        let first = run(&input, &output, &settings(2, 1, 1), None).unwrap();
        let second = run(&input, &output, &settings(3, 2, 2), None).unwrap();
        assert_eq!(first.inserted, 5);
        assert_eq!(second.inserted, 5);
        assert_eq!(count_rows(&output), 5);
    }

    #[test]
    fn worker_count_does_not_change_output() {
        let html = fixture("acme");
        let mut stored = Vec::new();
        for workers in [1, 4] {
            let (input, output) = memory_stores();
            for i in 0..6 {
                let body = if i % 3 == 0 { None } else { Some(html.as_str()) };
                seed(&input, &format!("c{}", i), body);
            }
            run(&input, &output, &settings(4, 3, workers), None).unwrap();
            let ids: Vec<_> = (0..6)
                .map(|i| db::fetch_output(&output, OUTPUT, &format!("c{}", i)).unwrap())
                .collect();
            stored.push(ids);
        }
        assert_eq!(stored[0], stored[1]);
        assert_eq!(stored[0].iter().filter(|r| r.is_some()).count(), 4);
    }

    #[test]
    fn limit_stops_early() {
        let (input, output) = memory_stores();
        for i in 0..5 {
            seed(&input, &format!("c{}", i), Some("<title>x</title>"));
        }
        let summary = run(&input, &output, &settings(2, 2, 1), Some(3)).unwrap();
        assert_eq!(summary.read, 3);
        assert_eq!(count_rows(&output), 3);
    }

    fn count_rows(conn: &Connection) -> usize {
        db::count_rows(conn, OUTPUT).unwrap()
    }
}
