use std::collections::HashSet;

use super::comments::Comments;
use super::options::FormatOptions;

/// A single formatted line with optional source line mapping.
#[derive(Debug, Clone)]
pub struct FormattedLine {
    /// The source line number this came from (1-indexed), if known.
    pub source_line: Option<usize>,
    /// The formatted content (without trailing newline).
    pub content: String,
}

/// Builder for formatted output.
#[derive(Debug, Default)]
pub struct FormattedOutput {
    lines: Vec<FormattedLine>,
    consumed_inline: HashSet<usize>,
}

impl FormattedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line with just content.
    pub fn push_line(&mut self, content: impl Into<String>) {
        self.lines.push(FormattedLine {
            source_line: None,
            content: content.into(),
        });
    }

    /// Add a line with source mapping.
    pub fn push_mapped(&mut self, content: impl Into<String>, source_line: usize) {
        self.lines.push(FormattedLine {
            source_line: Some(source_line),
            content: content.into(),
        });
    }

    /// Add a construct line, appending the inline comment found at
    /// `inline_line` if one exists and has not been consumed yet.
    pub fn push_with_inline(
        &mut self,
        content: String,
        map_line: usize,
        inline_line: usize,
        comments: &Comments,
    ) {
        let content = match comments.inline(inline_line) {
            Some(comment) if self.consumed_inline.insert(inline_line) => {
                format!("{}  {}", content, comment)
            }
            _ => content,
        };
        self.push_mapped(content, map_line);
    }

    /// Add an empty line.
    pub fn push_empty(&mut self) {
        self.push_line("");
    }

    /// Add blank lines up to `count`, accounting for blanks already at the
    /// tail. Never inserts before the first line; the count itself comes
    /// from the blank-line policy, which owns any clamping.
    pub fn push_blank_lines(&mut self, count: usize) {
        if self.lines.is_empty() {
            return;
        }
        let to_add = count.saturating_sub(self.trailing_blank_count());
        for _ in 0..to_add {
            self.push_empty();
        }
    }

    fn trailing_blank_count(&self) -> usize {
        self.lines
            .iter()
            .rev()
            .take_while(|l| l.content.is_empty())
            .count()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Convert to final text output.
    pub fn into_text(self, options: &FormatOptions) -> String {
        let mut result: Vec<&str> = self.lines.iter().map(|l| l.content.as_str()).collect();

        // Drop trailing blank lines; a single newline is added back below.
        while result.last().map(|s| s.is_empty()).unwrap_or(false) {
            result.pop();
        }

        let mut output = result.join("\n");
        if options.trailing_newline && !output.is_empty() {
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_follow_requested_count() {
        let mut out = FormattedOutput::new();
        out.push_line("var x = 1");
        out.push_blank_lines(3);
        out.push_line("var y = 2");
        let text = out.into_text(&FormatOptions::default());
        assert_eq!(text, "var x = 1\n\n\n\nvar y = 2\n");
    }

    #[test]
    fn test_blank_lines_account_for_existing_tail() {
        let mut out = FormattedOutput::new();
        out.push_line("pass");
        out.push_empty();
        out.push_blank_lines(2);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_no_leading_blank_lines() {
        let mut out = FormattedOutput::new();
        out.push_blank_lines(2);
        out.push_line("pass");
        let text = out.into_text(&FormatOptions::default());
        assert_eq!(text, "pass\n");
    }

    #[test]
    fn test_inline_comment_consumed_once() {
        let comments = Comments::extract("pass;pass  # note");
        let mut out = FormattedOutput::new();
        out.push_with_inline("pass".to_string(), 1, 1, &comments);
        out.push_with_inline("pass".to_string(), 1, 1, &comments);
        let text = out.into_text(&FormatOptions::default());
        assert_eq!(text, "pass  # note\npass\n");
    }

    #[test]
    fn test_trailing_blanks_trimmed() {
        let mut out = FormattedOutput::new();
        out.push_line("pass");
        out.push_empty();
        out.push_empty();
        let text = out.into_text(&FormatOptions::default());
        assert_eq!(text, "pass\n");
    }
}
