//! Output emission
//!
//! Writes the rewritten XML files, the layout-id map and the refreshed
//! history cache into the output directory.

use crate::history::{self, HistoryRecord};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Reserved file name of the layout-id map inside the output directory
pub const LAYOUT_ID_FILE_NAME: &str = "layout_ids";

/// First layout id handed out in a run
pub const LAYOUT_ID_BASE: u32 = 10000;

/// Output file name -> allocated layout id
pub type LayoutIdMap = BTreeMap<String, u32>;

/// Write one rewritten layout file under the output directory
pub fn write_layout_file(out_dir: &Path, file_name: &str, xml: &str) -> io::Result<()> {
    fs::write(out_dir.join(file_name), xml)
}

/// Write the layout-id map as lines of `<numeric-id>=<file-name>`
///
/// Files are processed in path-sorted order and ids assigned sequentially,
/// so iterating the name-ordered map also emits ids in ascending order.
pub fn write_layout_id_map(out_dir: &Path, map: &LayoutIdMap) -> io::Result<()> {
    let mut text = String::new();
    for (name, id) in map {
        text.push_str(&id.to_string());
        text.push('=');
        text.push_str(name);
        text.push('\n');
    }
    fs::write(out_dir.join(LAYOUT_ID_FILE_NAME), text)
}

/// Persist a fresh history snapshot for the given input files
///
/// Inputs whose timestamp cannot be read are skipped. The history is a
/// best-effort cache: a write failure is logged and otherwise ignored.
pub fn refresh_history(out_dir: &Path, files: &[PathBuf]) {
    let records: Vec<HistoryRecord> = files
        .iter()
        .filter_map(|file| {
            history::file_timestamp(file).map(|ts_micros| HistoryRecord {
                path: file.clone(),
                ts_micros,
            })
        })
        .collect();

    if let Err(err) = history::write(out_dir, &records) {
        warn!("failed to write history cache: {err}");
    }
}
