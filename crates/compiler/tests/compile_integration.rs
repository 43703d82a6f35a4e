//! End-to-end compilation runs over real directories

use layoutc_compiler::{
    history, output, CompileError, LayoutCompiler, ResolveError,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;
use tempfile::TempDir;

const MAIN_XML: &str = r#"<?xml version="1.0"?>
<RestraintLayout width="fill" height="fill">
    <TextView id="@+id/title" below="@id/toolbar" text="Hello"/>
    <Toolbar id="@+id/toolbar"/>
    <Button id="@+id/ok" align="@id/title, @id/toolbar"/>
</RestraintLayout>"#;

const DIALOG_XML: &str = r#"<?xml version="1.0"?>
<LinearLayout width="auto" height="auto">
    <TextView id="@+id/message"/>
</LinearLayout>"#;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn setup() -> (TempDir, TempDir) {
    let res = TempDir::new().unwrap();
    write_file(res.path(), "main.xml", MAIN_XML);
    write_file(res.path(), "dialog.xml", DIALOG_XML);
    (res, TempDir::new().unwrap())
}

#[test]
fn full_run_writes_outputs_and_tables() {
    let (res, out) = setup();
    let mut compiler = LayoutCompiler::new();
    let outcome = compiler.compile(res.path(), out.path()).unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.processed, 2);

    // Files are processed in path-sorted order: dialog.xml before main.xml.
    let id_map = fs::read_to_string(out.path().join(output::LAYOUT_ID_FILE_NAME)).unwrap();
    assert_eq!(id_map, "10000=dialog.xml\n10001=main.xml\n");

    // dialog.xml declares one id first, main.xml the next three.
    assert_eq!(compiler.view_ids().get("message"), Some(&10000));
    assert_eq!(compiler.view_ids().get("title"), Some(&10001));
    assert_eq!(compiler.view_ids().get("toolbar"), Some(&10002));
    assert_eq!(compiler.view_ids().get("ok"), Some(&10003));

    let main_out = fs::read_to_string(out.path().join("main.xml")).unwrap();
    assert!(!main_out.contains('@'));
    assert!(main_out.contains(r#"id="10001""#));
    assert!(main_out.contains(r#"below="10002""#), "forward reference resolved: {main_out}");
    assert!(main_out.contains(r#"align="10001, 10002""#));

    // History matches the current input set.
    let records = history::read(out.path());
    assert_eq!(records.len(), 2);
}

#[test]
fn every_view_id_is_unique() {
    let (res, out) = setup();
    let mut compiler = LayoutCompiler::new();
    compiler.compile(res.path(), out.path()).unwrap();

    let mut ids: Vec<u32> = compiler.view_ids().values().copied().collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), compiler.view_ids().len());
}

#[test]
fn identical_inputs_compile_identically() {
    let (res, out_a) = setup();
    let out_b = TempDir::new().unwrap();

    let mut first = LayoutCompiler::new();
    first.compile(res.path(), out_a.path()).unwrap();
    let mut second = LayoutCompiler::new();
    second.compile(res.path(), out_b.path()).unwrap();

    assert_eq!(first.view_ids(), second.view_ids());
    assert_eq!(first.layout_ids(), second.layout_ids());
    for name in ["main.xml", "dialog.xml", output::LAYOUT_ID_FILE_NAME] {
        assert_eq!(
            fs::read(out_a.path().join(name)).unwrap(),
            fs::read(out_b.path().join(name)).unwrap(),
            "output {name} differs between runs"
        );
    }
}

#[test]
fn unchanged_inputs_skip_recompilation() {
    let (res, out) = setup();
    LayoutCompiler::new().compile(res.path(), out.path()).unwrap();

    // A stray output with no matching input gets reconciled away.
    write_file(out.path(), "stray.xml", "<a/>");

    let outcome = LayoutCompiler::new().compile(res.path(), out.path()).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.processed, 0);
    assert!(!out.path().join("stray.xml").exists());
    assert!(out.path().join("main.xml").exists());
    assert!(out.path().join(output::LAYOUT_ID_FILE_NAME).exists());
    assert!(out.path().join(history::HISTORY_FILE_NAME).exists());
}

#[test]
fn modified_input_forces_rebuild() {
    let (res, out) = setup();
    LayoutCompiler::new().compile(res.path(), out.path()).unwrap();

    // mtime granularity is microseconds; make sure the rewrite moves it.
    sleep(Duration::from_millis(25));
    write_file(res.path(), "dialog.xml", DIALOG_XML);

    let outcome = LayoutCompiler::new().compile(res.path(), out.path()).unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.processed, 2);
}

#[test]
fn removed_input_forces_rebuild_and_drops_output() {
    let (res, out) = setup();
    LayoutCompiler::new().compile(res.path(), out.path()).unwrap();
    assert!(out.path().join("dialog.xml").exists());

    fs::remove_file(res.path().join("dialog.xml")).unwrap();

    let mut compiler = LayoutCompiler::new();
    let outcome = compiler.compile(res.path(), out.path()).unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.processed, 1);
    assert!(!out.path().join("dialog.xml").exists());
    assert!(compiler.view_ids().get("message").is_none());
}

#[test]
fn corrupt_history_degrades_to_full_rebuild() {
    let (res, out) = setup();
    LayoutCompiler::new().compile(res.path(), out.path()).unwrap();

    fs::write(out.path().join(history::HISTORY_FILE_NAME), [0x01, 0x00]).unwrap();

    let outcome = LayoutCompiler::new().compile(res.path(), out.path()).unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.processed, 2);
}

#[test]
fn cross_file_duplicate_aborts_the_run() {
    let res = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_file(res.path(), "a.xml", r#"<Root id="@+id/dup"/>"#);
    write_file(res.path(), "b.xml", r#"<Root id="@+id/dup"/>"#);

    let err = LayoutCompiler::new()
        .compile(res.path(), out.path())
        .unwrap_err();
    match err {
        CompileError::Resolve { file, source } => {
            assert!(file.ends_with("b.xml"));
            assert!(matches!(source, ResolveError::DuplicateAcrossFiles { .. }));
        }
        other => panic!("expected resolve error, got {other}"),
    }
}

#[test]
fn within_file_duplicate_aborts_the_run() {
    let res = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_file(
        res.path(),
        "a.xml",
        r#"<Root><a id="@+id/dup"/><b id="@+id/dup"/></Root>"#,
    );

    let err = LayoutCompiler::new()
        .compile(res.path(), out.path())
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::Resolve {
            source: ResolveError::DuplicateInFile { .. },
            ..
        }
    ));
}

#[test]
fn parse_failure_names_the_file() {
    let res = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_file(res.path(), "broken.xml", "<Root><unclosed></Root>");

    let err = LayoutCompiler::new()
        .compile(res.path(), out.path())
        .unwrap_err();
    match err {
        CompileError::Parse { file, .. } => assert!(file.ends_with("broken.xml")),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn token_free_file_round_trips() {
    let res = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = r#"<LinearLayout width="fill"><TextView text="plain"/></LinearLayout>"#;
    write_file(res.path(), "plain.xml", source);

    let mut compiler = LayoutCompiler::new();
    compiler.compile(res.path(), out.path()).unwrap();
    assert!(compiler.view_ids().is_empty());

    let rewritten = fs::read(out.path().join("plain.xml")).unwrap();
    assert_eq!(
        layoutc_core::xml::parse(source.as_bytes()).unwrap(),
        layoutc_core::xml::parse(&rewritten).unwrap(),
    );
}
