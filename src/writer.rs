use rusqlite::Connection;
use tracing::debug;

use crate::db::{self, OutputRecord};
use crate::error::StoreError;

/// Persist records in contiguous groups of at most `group_size`.
///
/// Duplicate-key rejections are dropped; the rest of each group is still
/// committed. Any other failure stops the write and is returned.
pub fn write_groups(
    conn: &Connection,
    table: &str,
    records: &[OutputRecord],
    group_size: usize,
) -> Result<(), StoreError> {
    for group in records.chunks(group_size.max(1)) {
        match db::insert_unordered(conn, table, group) {
            Ok(()) => {}
            Err(err) if err.is_duplicate_only() => {
                debug!(group = group.len(), error = %err, "skipped duplicate keys");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::*;

    #[test]
    fn group_with_existing_id_commits_the_rest() {
        let (_, output) = memory_stores();
        db::insert_unordered(&output, OUTPUT, &[output_record("dup")]).unwrap();

        let records: Vec<_> = ["a", "dup", "b", "c", "d"]
            .iter()
            .map(|id| output_record(id))
            .collect();
        write_groups(&output, OUTPUT, &records, 2).unwrap();

        assert_eq!(db::count_rows(&output, OUTPUT).unwrap(), 5);
        for id in ["a", "b", "c", "d"] {
            assert!(db::fetch_output(&output, OUTPUT, id).unwrap().is_some());
        }
        let kept = db::fetch_output(&output, OUTPUT, "dup").unwrap().unwrap();
        assert_eq!(kept.parsed_data.title, "Title dup");
    }

    #[test]
    fn other_failures_propagate() {
        let (_, output) = memory_stores();
        let err = write_groups(&output, "no_such_table", &[output_record("a")], 10).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[test]
    fn empty_input_writes_nothing() {
        let (_, output) = memory_stores();
        write_groups(&output, OUTPUT, &[], 0).unwrap();
        assert_eq!(db::count_rows(&output, OUTPUT).unwrap(), 0);
    }
}
