//! Compilation run orchestrator

use crate::detect;
use crate::error::CompileError;
use crate::history;
use crate::output::{self, LayoutIdMap, LAYOUT_ID_BASE};
use crate::resolve::{self, ResolveCtx, SymbolTable};
use crate::Result;
use layoutc_core::xml;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// What a compilation run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Whether any input had changed and a full rebuild ran
    pub changed: bool,
    /// Number of layout files processed
    pub processed: usize,
}

/// One-shot layout compiler
///
/// Runs end-to-end over an input and an output directory; after a
/// successful run the accumulated view-id and layout-id tables are
/// available to downstream consumers. Compilation is all-or-nothing: the
/// first hard failure aborts the run.
#[derive(Debug, Default)]
pub struct LayoutCompiler {
    view_ids: SymbolTable,
    layout_ids: LayoutIdMap,
}

impl LayoutCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project-wide symbolic name -> view id table from the last run
    pub fn view_ids(&self) -> &SymbolTable {
        &self.view_ids
    }

    /// Output file name -> layout id table from the last run
    pub fn layout_ids(&self) -> &LayoutIdMap {
        &self.layout_ids
    }

    /// Compile every layout file under `res_dir` into `out_dir`
    ///
    /// Skips all work when the persisted history matches the current input
    /// set, only reconciling stale outputs. Otherwise the output directory
    /// is cleared and every input is reprocessed.
    pub fn compile(&mut self, res_dir: &Path, out_dir: &Path) -> Result<Outcome> {
        let files = detect::find_layout_files(res_dir)?;
        if files.is_empty() {
            info!("no layout files found in {}", res_dir.display());
        } else {
            info!("{} layout file(s) found", files.len());
        }

        let records = history::read(out_dir);
        if !detect::detect_changes(&files, &records) {
            detect::remove_stale_outputs(&files, out_dir);
            info!("no layout files were changed");
            return Ok(Outcome {
                changed: false,
                processed: 0,
            });
        }

        detect::clear_output_dir(out_dir).map_err(|source| CompileError::OutDir {
            dir: out_dir.to_path_buf(),
            source,
        })?;
        fs::create_dir_all(out_dir).map_err(|source| CompileError::OutDir {
            dir: out_dir.to_path_buf(),
            source,
        })?;

        let mut ctx = ResolveCtx::new();
        let mut layout_ids = LayoutIdMap::new();
        let mut next_layout_id = LAYOUT_ID_BASE;

        for file in &files {
            info!("processing {}", file.display());

            let bytes = fs::read(file).map_err(|source| CompileError::Read {
                file: file.clone(),
                source,
            })?;
            let mut root = xml::parse(&bytes).map_err(|source| CompileError::Parse {
                file: file.clone(),
                source,
            })?;
            resolve::resolve_file(&mut root, &mut ctx).map_err(|source| CompileError::Resolve {
                file: file.clone(),
                source,
            })?;
            let text = xml::serialize(&root).map_err(|source| CompileError::Serialize {
                file: file.clone(),
                source,
            })?;

            let file_name = match file.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            output::write_layout_file(out_dir, &file_name, &text).map_err(|source| {
                CompileError::Write {
                    file: out_dir.join(&file_name),
                    source,
                }
            })?;

            layout_ids.insert(file_name, next_layout_id);
            next_layout_id += 1;
        }

        if layout_ids.is_empty() {
            info!("layout id map is empty, no file generated");
        } else {
            debug!("generating layout id file");
            output::write_layout_id_map(out_dir, &layout_ids).map_err(|source| {
                CompileError::Write {
                    file: out_dir.join(output::LAYOUT_ID_FILE_NAME),
                    source,
                }
            })?;
        }

        output::refresh_history(out_dir, &files);

        let processed = files.len();
        self.view_ids = ctx.into_project_ids();
        self.layout_ids = layout_ids;
        Ok(Outcome {
            changed: true,
            processed,
        })
    }
}
