use std::fs;
use std::path::PathBuf;

use gdfmt::batch::{needs_attention, process_file, process_files, FileStatus, Mode};
use gdfmt::format::FormatOptions;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_check_mode_reports_without_modifying() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.gd", "var   x   =   1\n");

    let report = process_file(&path, &FormatOptions::default(), Mode::Check, false);
    assert_eq!(report.status, FileStatus::Changed);
    assert_eq!(fs::read_to_string(&path).unwrap(), "var   x   =   1\n");
}

#[test]
fn test_write_mode_rewrites_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.gd", "var   x   =   1\n");

    let report = process_file(&path, &FormatOptions::default(), Mode::Write, false);
    assert_eq!(report.status, FileStatus::Changed);
    assert_eq!(fs::read_to_string(&path).unwrap(), "var x = 1\n");
}

#[test]
fn test_canonical_file_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.gd", "var x = 1\n");

    let report = process_file(&path, &FormatOptions::default(), Mode::Write, false);
    assert_eq!(report.status, FileStatus::Unchanged);
}

#[test]
fn test_invalid_file_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let good_before = write_file(&dir, "a.gd", "var   a   =   1\n");
    let bad = write_file(&dir, "b.gd", "func (((\n");
    let good_after = write_file(&dir, "c.gd", "var   c   =   3\n");

    let paths = vec![good_before.clone(), bad.clone(), good_after.clone()];
    let reports = process_files(&paths, &FormatOptions::default(), Mode::Write, false);

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].status, FileStatus::Changed);
    assert!(matches!(reports[1].status, FileStatus::Failed(_)));
    assert_eq!(reports[2].status, FileStatus::Changed);

    // Valid neighbors were still formatted, the bad file kept as-is.
    assert_eq!(fs::read_to_string(&good_before).unwrap(), "var a = 1\n");
    assert_eq!(fs::read_to_string(&bad).unwrap(), "func (((\n");
    assert_eq!(fs::read_to_string(&good_after).unwrap(), "var c = 3\n");
}

#[test]
fn test_diff_mode_produces_a_unified_diff() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.gd", "var   x   =   1\n");

    let report = process_file(&path, &FormatOptions::default(), Mode::Diff, false);
    assert_eq!(report.status, FileStatus::Changed);
    let diff = report.diff.expect("diff expected for a changed file");
    assert!(diff.contains("-var   x   =   1"));
    assert!(diff.contains("+var x = 1"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "var   x   =   1\n");
}

#[test]
fn test_write_mode_run_is_clean_after_reformatting() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.gd", "var   x   =   1\n");

    let reports = process_files(&[path], &FormatOptions::default(), Mode::Write, false);
    assert_eq!(reports[0].status, FileStatus::Changed);
    assert!(!needs_attention(&reports, Mode::Write));
}

#[test]
fn test_check_mode_run_reports_pending_changes() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.gd", "var   x   =   1\n");

    let reports = process_files(&[path], &FormatOptions::default(), Mode::Check, false);
    assert!(needs_attention(&reports, Mode::Check));
}

#[test]
fn test_failed_file_makes_any_run_unclean() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.gd", "func (((\n");

    let reports = process_files(&[path], &FormatOptions::default(), Mode::Write, false);
    assert!(needs_attention(&reports, Mode::Write));
}

#[test]
fn test_missing_file_is_reported_as_failed() {
    let report = process_file(
        std::path::Path::new("/nonexistent/x.gd"),
        &FormatOptions::default(),
        Mode::Check,
        false,
    );
    assert!(matches!(report.status, FileStatus::Failed(_)));
}

#[test]
fn test_reports_keep_input_order() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..8)
        .map(|i| write_file(&dir, &format!("f{}.gd", i), "var x = 1\n"))
        .collect();

    let reports = process_files(&paths, &FormatOptions::default(), Mode::Check, false);
    let reported: Vec<&PathBuf> = reports.iter().map(|r| &r.path).collect();
    let expected: Vec<&PathBuf> = paths.iter().collect();
    assert_eq!(reported, expected);
}
