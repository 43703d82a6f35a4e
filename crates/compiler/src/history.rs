//! Binary history store for incremental builds
//!
//! Persists the set of input paths and modification timestamps the compiler
//! saw on its last successful run. The store is a best-effort cache: a
//! missing, truncated or otherwise unusable file degrades to "no history"
//! and forces a full rebuild, it never fails the run.
//!
//! On-disk layout (multi-byte fields big-endian):
//!
//! ```text
//! available : 1 byte   (0 = no valid history follows)
//! count     : 4 bytes
//! records x count:
//!   path    : UTF-8 bytes, NUL-terminated
//!   ts      : 8 bytes   (microseconds since epoch)
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Reserved file name of the history cache inside the output directory
pub const HISTORY_FILE_NAME: &str = "layoutc_histories";

/// One previously processed input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Input file path as recorded on the last run
    pub path: PathBuf,
    /// Last-modified time, microseconds since the Unix epoch
    pub ts_micros: u64,
}

/// Load the persisted history from the output directory
///
/// Any failure to open or decode the file yields an empty history.
pub fn read(out_dir: &Path) -> Vec<HistoryRecord> {
    let file = match File::open(out_dir.join(HISTORY_FILE_NAME)) {
        Ok(file) => file,
        Err(_) => return Vec::new(),
    };
    read_from(&mut BufReader::new(file))
}

/// Persist the given records to the output directory
///
/// Writes nothing when `records` is empty. Callers treat failures as a lost
/// cache, not as a compile error.
pub fn write(out_dir: &Path, records: &[HistoryRecord]) -> io::Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let file = File::create(out_dir.join(HISTORY_FILE_NAME))?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, records)?;
    writer.flush()
}

/// Last-modified time of a file in microseconds since the Unix epoch
pub fn file_timestamp(path: &Path) -> Option<u64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    Some(since_epoch.as_micros() as u64)
}

fn read_from(reader: &mut impl Read) -> Vec<HistoryRecord> {
    let mut records = Vec::new();

    let mut available = [0u8; 1];
    if reader.read_exact(&mut available).is_err() || available[0] == 0 {
        return records;
    }

    let mut count_buf = [0u8; 4];
    if reader.read_exact(&mut count_buf).is_err() {
        return records;
    }
    let count = u32::from_be_bytes(count_buf);

    // A short read mid-record returns whatever parsed so far.
    for _ in 0..count {
        let mut path_bytes = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            if reader.read_exact(&mut byte).is_err() {
                return records;
            }
            if byte[0] == 0 {
                break;
            }
            path_bytes.push(byte[0]);
        }

        let mut ts_buf = [0u8; 8];
        if reader.read_exact(&mut ts_buf).is_err() {
            return records;
        }

        let path = match String::from_utf8(path_bytes) {
            Ok(path) => PathBuf::from(path),
            Err(_) => return records,
        };
        records.push(HistoryRecord {
            path,
            ts_micros: u64::from_be_bytes(ts_buf),
        });
    }

    records
}

fn write_to(writer: &mut impl Write, records: &[HistoryRecord]) -> io::Result<()> {
    writer.write_all(&[1u8])?;
    writer.write_all(&(records.len() as u32).to_be_bytes())?;
    for record in records {
        writer.write_all(record.path.to_string_lossy().as_bytes())?;
        writer.write_all(&[0u8])?;
        writer.write_all(&record.ts_micros.to_be_bytes())?;
    }
    Ok(())
}
