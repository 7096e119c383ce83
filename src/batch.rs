//! Multi-file formatting driver.
//!
//! Files are processed in parallel and independently: one file failing to
//! parse or failing a safety check never stops the others. The caller gets
//! one report per file and decides the exit status from them.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use similar::{ChangeTag, TextDiff};

use crate::format::{
    compare_ast_with_source, run_formatter, AstCheckResult, FormatOptions, FormatOutcome,
};
use crate::parser;

/// What to do with a file that is not in its canonical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rewrite the file in place.
    Write,
    /// Report only, leave the file untouched.
    Check,
    /// Print a unified diff, leave the file untouched.
    Diff,
}

/// Outcome of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Already canonical.
    Unchanged,
    /// Reformatted (Write) or would be reformatted (Check/Diff).
    Changed,
    /// Parse error, IO error, or failed safety check.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Unified diff, present in Diff mode when the file would change.
    pub diff: Option<String>,
    /// Output lines that stayed over the length budget.
    pub overlong_lines: Vec<usize>,
}

/// Format a set of files, keeping going past per-file failures. Reports come
/// back in the input order.
pub fn process_files(
    paths: &[PathBuf],
    options: &FormatOptions,
    mode: Mode,
    skip_safety_checks: bool,
) -> Vec<FileReport> {
    paths
        .par_iter()
        .map(|path| process_file(path, options, mode, skip_safety_checks))
        .collect()
}

/// Format one file according to the mode.
pub fn process_file(
    path: &Path,
    options: &FormatOptions,
    mode: Mode,
    skip_safety_checks: bool,
) -> FileReport {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => return failed(path, format!("read failed: {}", e)),
    };

    let outcome = match run_formatter(&source, options) {
        Ok(outcome) => outcome,
        Err(e) => return failed(path, e.to_string()),
    };

    if !skip_safety_checks {
        if let Err(msg) = verify_ast_equivalence(&source, &outcome.text) {
            return failed(path, msg);
        }
        if let Err(msg) = verify_idempotent(&outcome, options) {
            return failed(path, msg);
        }
    }

    let changed = source != outcome.text;
    let mut diff = None;

    if changed {
        match mode {
            Mode::Write => {
                if let Err(e) = std::fs::write(path, &outcome.text) {
                    return failed(path, format!("write failed: {}", e));
                }
            }
            Mode::Check => {}
            Mode::Diff => {
                diff = Some(render_diff(&path.display().to_string(), &source, &outcome.text));
            }
        }
    }

    FileReport {
        path: path.to_path_buf(),
        status: if changed {
            FileStatus::Changed
        } else {
            FileStatus::Unchanged
        },
        diff,
        overlong_lines: outcome.overlong_lines,
    }
}

/// Whether a run's reports warrant a nonzero exit. Failures always do;
/// changed files only when the run did not write them (Check/Diff), since a
/// successful in-place rewrite is a clean outcome.
pub fn needs_attention(reports: &[FileReport], mode: Mode) -> bool {
    reports.iter().any(|report| match report.status {
        FileStatus::Failed(_) => true,
        FileStatus::Changed => mode != Mode::Write,
        FileStatus::Unchanged => false,
    })
}

fn failed(path: &Path, message: String) -> FileReport {
    FileReport {
        path: path.to_path_buf(),
        status: FileStatus::Failed(message),
        diff: None,
        overlong_lines: Vec::new(),
    }
}

/// The formatted output must parse back to the same program.
pub fn verify_ast_equivalence(original: &str, formatted: &str) -> Result<(), String> {
    let original_tree =
        parser::parse(original).map_err(|e| format!("parse error in input: {}", e))?;
    let formatted_tree =
        parser::parse(formatted).map_err(|e| format!("parse error in output: {}", e))?;

    match compare_ast_with_source(&original_tree, original, &formatted_tree, formatted) {
        AstCheckResult::Equivalent => Ok(()),
        AstCheckResult::Different { path, difference } => Err(format!(
            "formatting changed the program at {}: {}",
            path, difference
        )),
    }
}

/// Formatting the output again must reproduce it exactly.
pub fn verify_idempotent(outcome: &FormatOutcome, options: &FormatOptions) -> Result<(), String> {
    let second = run_formatter(&outcome.text, options).map_err(|e| e.to_string())?;
    if outcome.text == second.text {
        Ok(())
    } else {
        Err("formatting is not idempotent for this file".to_string())
    }
}

/// Unified diff between the original and formatted text.
pub fn render_diff(filename: &str, original: &str, formatted: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("--- {}\n", filename));
    out.push_str(&format!("+++ {}\n", filename));

    let diff = TextDiff::from_lines(original, formatted);
    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            out.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                out.push_str(&format!("{}{}", sign, change));
            }
        }
    }
    out
}
