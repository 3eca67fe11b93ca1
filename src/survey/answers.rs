// CSV answer log in the app directory.
// Header written once when the file is created; one row per answer:
//   timestamp,variable,score
// timestamp is seconds since boot (no RTC).

use core::fmt::Write as _;

use crate::drivers::storage::{FileStore, StorageError};
use crate::ui::StackFmt;

pub const ANSWERS_FILE: &str = "ANSWERS.CSV";
pub const CSV_HEADER: &[u8] = b"timestamp,variable,score\n";

// longest row: u32 + ',' + code + ',' + i16 + '\n'
pub const ROW_CAP: usize = 48;

/// Append one answer row, writing the header first if the file is new.
pub fn append_answer<S: FileStore>(
    store: &S,
    timestamp: u32,
    code: &str,
    score: i16,
) -> Result<(), StorageError> {
    store.ensure_app_dir()?;

    if !store.exists(ANSWERS_FILE)? {
        store.append(ANSWERS_FILE, CSV_HEADER)?;
    }

    let mut row = StackFmt::<ROW_CAP>::new();
    let _ = writeln!(row, "{},{},{}", timestamp, code, score);
    store.append(ANSWERS_FILE, row.as_str().as_bytes())
}

/// Row count and the most recent row of the log.
pub struct LogSummary {
    pub rows: u32,
    pub last: StackFmt<ROW_CAP>,
}

/// Data rows in the log (lines after the header). Missing file is 0.
pub fn count_rows<S: FileStore>(store: &S) -> Result<u32, StorageError> {
    summarize(store).map(|s| s.rows)
}

/// One pass over the log: count rows, keep the last complete one.
pub fn summarize<S: FileStore>(store: &S) -> Result<LogSummary, StorageError> {
    let mut buf = [0u8; 256];
    let mut offset = 0u32;
    let mut lines = 0u32;

    let mut line = [0u8; ROW_CAP];
    let mut line_len = 0usize;
    let mut last = [0u8; ROW_CAP];
    let mut last_len = 0usize;

    loop {
        let n = match store.read_chunk(ANSWERS_FILE, offset, &mut buf) {
            Ok(n) => n,
            Err(StorageError::NotFound) => break,
            Err(e) => return Err(e),
        };
        if n == 0 {
            break;
        }
        for &b in &buf[..n] {
            if b == b'\n' {
                lines += 1;
                last[..line_len].copy_from_slice(&line[..line_len]);
                last_len = line_len;
                line_len = 0;
            } else if line_len < ROW_CAP {
                line[line_len] = b;
                line_len += 1;
            }
        }
        offset += n as u32;
    }

    let mut summary = LogSummary {
        rows: lines.saturating_sub(1),
        last: StackFmt::new(),
    };
    if summary.rows > 0 {
        let text = core::str::from_utf8(&last[..last_len]).unwrap_or("");
        let _ = summary.last.write_str(text.trim_end_matches('\r'));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::storage::mem::MemStore;

    #[test]
    fn first_answer_writes_header() {
        let store = MemStore::new();

        append_answer(&store, 42, "c", 3).unwrap();

        assert!(store.dir_made.get());
        assert_eq!(
            store.contents(ANSWERS_FILE).unwrap(),
            b"timestamp,variable,score\n42,c,3\n".to_vec()
        );
    }

    #[test]
    fn existing_file_gets_row_only() {
        let store = MemStore::new().with_file(ANSWERS_FILE, b"timestamp,variable,score\n1,a,5\n");

        append_answer(&store, 7, "mood", -2).unwrap();

        assert_eq!(
            store.contents(ANSWERS_FILE).unwrap(),
            b"timestamp,variable,score\n1,a,5\n7,mood,-2\n".to_vec()
        );
    }

    #[test]
    fn write_failure_is_reported() {
        let store = MemStore::new();
        store.fail_writes.set(true);

        assert_eq!(append_answer(&store, 0, "c", 1), Err(StorageError::Write));
    }

    #[test]
    fn missing_card_is_reported() {
        let store = MemStore::new();
        store.absent.set(true);

        assert_eq!(append_answer(&store, 0, "c", 1), Err(StorageError::NoCard));
    }

    #[test]
    fn count_rows_skips_header() {
        let store = MemStore::new();
        assert_eq!(count_rows(&store).unwrap(), 0);

        for i in 0..30 {
            append_answer(&store, i, "energy", 4).unwrap();
        }
        assert_eq!(count_rows(&store).unwrap(), 30);
    }

    #[test]
    fn summary_keeps_last_row() {
        let store = MemStore::new();
        let s = summarize(&store).unwrap();
        assert_eq!(s.rows, 0);
        assert!(s.last.is_empty());

        append_answer(&store, 10, "mood", 2).unwrap();
        assert_eq!(summarize(&store).unwrap().last.as_str(), "10,mood,2");

        // rows straddle the 256-byte read chunks
        for i in 0..40 {
            append_answer(&store, 100 + i, "stress", 7).unwrap();
        }
        let s = summarize(&store).unwrap();
        assert_eq!(s.rows, 41);
        assert_eq!(s.last.as_str(), "139,stress,7");
    }

    #[test]
    fn header_alone_has_no_last_row() {
        let store = MemStore::new().with_file(ANSWERS_FILE, CSV_HEADER);
        let s = summarize(&store).unwrap();
        assert_eq!(s.rows, 0);
        assert!(s.last.is_empty());
    }
}
