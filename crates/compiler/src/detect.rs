//! Change detection against the persisted history
//!
//! Decides whether a run needs to recompile at all. Identifier allocation is
//! order- and set-dependent across the whole project, so any single changed,
//! added or removed input forces a full rebuild; there is no per-file
//! incremental path.

use crate::error::CompileError;
use crate::history::{self, HistoryRecord};
use crate::Result;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File extension of layout definitions, matched case-insensitively
pub const LAYOUT_EXTENSION: &str = "xml";

/// Enumerate layout files directly inside `dir`, sorted lexicographically
///
/// The scan is flat: subdirectories are not descended into.
pub fn find_layout_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| CompileError::Scan {
            dir: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && has_layout_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Check whether the current input set differs from the recorded history
///
/// A file counts as unchanged only when a history record matches both its
/// path and its current modification timestamp. Records left over after
/// matching mean inputs were removed since the last run, which is also a
/// change.
pub fn detect_changes(files: &[PathBuf], records: &[HistoryRecord]) -> bool {
    let mut remaining: Vec<&HistoryRecord> = records.iter().collect();
    for file in files {
        let ts = history::file_timestamp(file);
        let hit = remaining
            .iter()
            .position(|record| record.path == *file && Some(record.ts_micros) == ts);
        match hit {
            Some(idx) => {
                remaining.remove(idx);
            }
            None => {
                debug!("changed input: {}", file.display());
                return true;
            }
        }
    }
    !remaining.is_empty()
}

/// Delete output layout files whose name has no corresponding input file
///
/// Used on the no-change path to reconcile the output directory after inputs
/// were removed. Only files with the layout extension are considered, so the
/// history cache and the layout-id file survive. Best-effort: individual
/// removal failures are logged, not fatal.
pub fn remove_stale_outputs(files: &[PathBuf], out_dir: &Path) {
    let entries = match fs::read_dir(out_dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    let input_names: HashSet<&OsStr> = files.iter().filter_map(|p| p.file_name()).collect();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() || !has_layout_extension(&path) {
            continue;
        }
        let stale = path
            .file_name()
            .is_some_and(|name| !input_names.contains(name));
        if stale {
            debug!("removing stale output: {}", path.display());
            if let Err(err) = fs::remove_file(&path) {
                warn!("failed to remove stale output {}: {err}", path.display());
            }
        }
    }
}

/// Remove the output directory entirely ahead of a full rebuild
///
/// A missing directory is fine; any other failure is fatal, since leftover
/// state from an earlier run must never leak into new output.
pub fn clear_output_dir(out_dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(out_dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

fn has_layout_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LAYOUT_EXTENSION))
}
