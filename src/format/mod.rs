pub mod ast_check;
mod blank_lines;
mod comments;
mod context;
mod nodes;
mod options;
mod output;
mod skip_regions;
pub mod wrap;

pub use ast_check::{compare_ast_with_source, AstCheckResult};
pub use blank_lines::{BlankLineTable, Category};
pub use comments::Comments;
pub use context::{Context, ExpressionSpan};
pub use options::{FormatOptions, IndentStyle};
pub use output::{FormattedLine, FormattedOutput};

use thiserror::Error;

use crate::parser::{self, ParseError};
use skip_regions::SkipRegions;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The formatted text plus anything worth reporting about it.
#[derive(Debug, Clone)]
pub struct FormatOutcome {
    pub text: String,
    /// 1-indexed output lines that still exceed the length budget after
    /// wrapping (no legal split point existed).
    pub overlong_lines: Vec<usize>,
}

/// Format GDScript source into its canonical shape.
pub fn run_formatter(source: &str, options: &FormatOptions) -> Result<FormatOutcome, FormatError> {
    let tree = parser::parse(source)?;

    let comments = Comments::extract(source);
    let skip_regions = SkipRegions::parse(source);
    let source_lines: Vec<&str> = source.lines().collect();
    let top_level_table = options.top_level_table();
    let nested_table = BlankLineTable::nested();

    let mut ctx = Context::root(
        source,
        &source_lines,
        options,
        &comments,
        &skip_regions,
        &top_level_table,
        &nested_table,
    );

    let mut out = FormattedOutput::new();
    nodes::render_block(tree.root_node(), &mut ctx, &mut out);

    let text = out.into_text(options);
    let overlong_lines = scan_overlong(&text, options);

    Ok(FormatOutcome {
        text,
        overlong_lines,
    })
}

/// Convenience wrapper returning just the text.
pub fn format_source(source: &str, options: &FormatOptions) -> Result<String, FormatError> {
    run_formatter(source, options).map(|outcome| outcome.text)
}

/// Final pass over the rendered text: any line still over budget had no
/// legal split point and gets reported rather than mangled. Skip-region
/// markers survive formatting, so the scan finds them in the output itself
/// and exempts the lines they cover.
fn scan_overlong(text: &str, options: &FormatOptions) -> Vec<usize> {
    let output_regions = SkipRegions::parse(text);
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line_num = idx + 1;
            if output_regions.covers(line_num) {
                return None;
            }
            if options.visual_width(line) > options.max_line_length {
                Some(line_num)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_source() {
        let outcome = run_formatter("", &FormatOptions::default()).unwrap();
        assert_eq!(outcome.text, "");
        assert!(outcome.overlong_lines.is_empty());
    }

    #[test]
    fn test_invalid_source_is_rejected() {
        let result = run_formatter("func (((\n", &FormatOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_overlong_line_is_reported() {
        let long_name = "x".repeat(120);
        let source = format!("var {} = 1\n", long_name);
        let outcome = run_formatter(&source, &FormatOptions::default()).unwrap();
        assert_eq!(outcome.overlong_lines, vec![1]);
    }
}
