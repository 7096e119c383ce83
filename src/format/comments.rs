use std::collections::BTreeMap;

/// Line-indexed comment tables, built once per source file.
///
/// Comments are not part of the tree-sitter AST, so they are extracted
/// separately and reattached during rendering. Ordered maps allow range
/// queries for "standalone comments between line A and line B".
#[derive(Debug, Default)]
pub struct Comments {
    /// Comments occupying their own line, keyed by line number (1-indexed).
    /// Stored trimmed; the renderer re-indents them to the owning scope.
    standalone: BTreeMap<usize, String>,
    /// Comments trailing code, keyed by line number (1-indexed).
    inline: BTreeMap<usize, String>,
}

impl Comments {
    /// Extract comments from source code.
    pub fn extract(source: &str) -> Self {
        let mut standalone = BTreeMap::new();
        let mut inline = BTreeMap::new();

        for (idx, line) in source.lines().enumerate() {
            let line_num = idx + 1; // 1-indexed
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with('#') {
                standalone.insert(line_num, trimmed.to_string());
            } else if let Some(hash_pos) = find_comment_start(line) {
                inline.insert(line_num, line[hash_pos..].trim_end().to_string());
            }
        }

        Self { standalone, inline }
    }

    /// Get a standalone comment for a line.
    pub fn standalone(&self, line: usize) -> Option<&str> {
        self.standalone.get(&line).map(String::as_str)
    }

    /// Get an inline comment for a line.
    pub fn inline(&self, line: usize) -> Option<&str> {
        self.inline.get(&line).map(String::as_str)
    }

    /// Standalone comments with line numbers in `from..before` (exclusive
    /// upper bound), in line order.
    pub fn standalone_in(&self, from: usize, before: usize) -> Vec<(usize, &str)> {
        if from >= before {
            return Vec::new();
        }
        self.standalone
            .range(from..before)
            .map(|(line, text)| (*line, text.as_str()))
            .collect()
    }
}

/// Find the start of a comment in a line, handling strings.
fn find_comment_start(line: &str) -> Option<usize> {
    let mut in_string = false;
    let mut string_char = ' ';
    let mut prev_char = ' ';

    for (i, ch) in line.char_indices() {
        if in_string {
            if ch == string_char && prev_char != '\\' {
                in_string = false;
            }
        } else if ch == '"' || ch == '\'' {
            in_string = true;
            string_char = ch;
        } else if ch == '#' {
            return Some(i);
        }
        prev_char = ch;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standalone_comment() {
        let source = "# This is a comment\nvar x = 1";
        let comments = Comments::extract(source);
        assert_eq!(comments.standalone(1), Some("# This is a comment"));
        assert_eq!(comments.standalone(2), None);
    }

    #[test]
    fn test_inline_comment() {
        let source = "var x = 1  # inline comment";
        let comments = Comments::extract(source);
        assert_eq!(comments.standalone(1), None);
        assert_eq!(comments.inline(1), Some("# inline comment"));
    }

    #[test]
    fn test_comment_in_string() {
        let source = "var x = \"# not a comment\"";
        let comments = Comments::extract(source);
        assert_eq!(comments.standalone(1), None);
        assert_eq!(comments.inline(1), None);
    }

    #[test]
    fn test_indented_standalone_comment_is_trimmed() {
        let source = "func foo():\n\t# indented comment\n\tpass";
        let comments = Comments::extract(source);
        assert_eq!(comments.standalone(2), Some("# indented comment"));
    }

    #[test]
    fn test_range_query() {
        let source = "var a = 1\n# one\n# two\n\n# three\nvar b = 2";
        let comments = Comments::extract(source);
        let between: Vec<usize> = comments.standalone_in(2, 6).iter().map(|(l, _)| *l).collect();
        assert_eq!(between, vec![2, 3, 5]);
        assert!(comments.standalone_in(6, 2).is_empty());
    }
}
