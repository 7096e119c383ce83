use tree_sitter::Node;

use super::blank_lines::BlankLineTable;
use super::comments::Comments;
use super::options::FormatOptions;
use super::skip_regions::SkipRegions;

/// An annotation waiting to be rendered in front of the next construct.
#[derive(Debug, Clone)]
pub struct PendingAnnotation {
    pub line: usize,
    pub text: String,
}

/// Per-scope formatting context.
///
/// One instance exists per nesting level. Indentation state is fixed at
/// construction and the only way to go deeper is `create_child_context`;
/// the line cursor and annotation buffer advance as the scope is rendered.
/// All read-only tables are shared by reference across one run.
pub struct Context<'a> {
    /// Original source code.
    pub source: &'a str,
    /// Source split into lines, for verbatim emission.
    pub source_lines: &'a [&'a str],
    /// Formatting options, fixed for the whole run.
    pub options: &'a FormatOptions,
    /// Comment index for the whole file.
    pub comments: &'a Comments,
    /// Regions to emit verbatim (# fmt: off/on).
    pub skip_regions: &'a SkipRegions,
    /// Last original source line consumed; never decreases within a branch.
    pub previously_processed_line: usize,
    /// Annotations collected for the next construct to render.
    pub pending_annotations: Vec<PendingAnnotation>,
    /// Rendered indent prefix, derived from the depth below.
    pub indent_string: String,
    top_level_table: &'a BlankLineTable,
    nested_table: &'a BlankLineTable,
    indent: usize,
}

impl<'a> Context<'a> {
    /// Create the root (file-scope) context.
    #[allow(clippy::too_many_arguments)]
    pub fn root(
        source: &'a str,
        source_lines: &'a [&'a str],
        options: &'a FormatOptions,
        comments: &'a Comments,
        skip_regions: &'a SkipRegions,
        top_level_table: &'a BlankLineTable,
        nested_table: &'a BlankLineTable,
    ) -> Self {
        Self {
            source,
            source_lines,
            options,
            comments,
            skip_regions,
            previously_processed_line: 0,
            pending_annotations: Vec::new(),
            indent_string: String::new(),
            top_level_table,
            nested_table,
            indent: 0,
        }
    }

    /// Derive the context for a nested scope, one indent level deeper.
    /// Shared tables are carried by reference; the child owns its own
    /// cursor and annotation buffer.
    pub fn create_child_context(&self, previously_processed_line: usize) -> Context<'a> {
        let single = self.options.indent_style.single_indent_size();
        let indent = self.indent + single;
        Context {
            source: self.source,
            source_lines: self.source_lines,
            options: self.options,
            comments: self.comments,
            skip_regions: self.skip_regions,
            previously_processed_line,
            pending_annotations: Vec::new(),
            indent_string: self.options.indent_style.as_str().repeat(indent / single),
            top_level_table: self.top_level_table,
            nested_table: self.nested_table,
            indent,
        }
    }

    /// The blank-line table in effect for this scope. The global override
    /// applies to top-level declarations only; nested scopes always use the
    /// built-in table.
    pub fn surrounding_empty_lines_for_scope(&self) -> &'a BlankLineTable {
        if self.indent == 0 {
            self.top_level_table
        } else {
            self.nested_table
        }
    }

    /// Get the original text of a node.
    pub fn node_text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    /// Get a line from the original source (1-indexed).
    pub fn source_line(&self, line: usize) -> Option<&'a str> {
        if line == 0 || line > self.source_lines.len() {
            None
        } else {
            Some(self.source_lines[line - 1])
        }
    }

    /// Check if a line number is in a skip region.
    pub fn is_skipped(&self, line: usize) -> bool {
        self.skip_regions.covers(line)
    }

    /// Check if a rendered line exceeds the configured length budget.
    pub fn exceeds_line_length(&self, s: &str) -> bool {
        self.options.visual_width(s) > self.options.max_line_length
    }
}

/// A rendered fragment pair around an expression, carrying the earliest
/// source lines each side is attributed to. Used when one logical line is
/// assembled from sub-fragments that may individually need to break.
#[derive(Debug, Clone)]
pub struct ExpressionSpan {
    pub prefix: String,
    pub prefix_line: usize,
    pub suffix: String,
    pub suffix_line: usize,
}

impl ExpressionSpan {
    pub fn new(
        prefix: impl Into<String>,
        prefix_line: usize,
        suffix: impl Into<String>,
        suffix_line: usize,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            prefix_line,
            suffix: suffix.into(),
            suffix_line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::blank_lines::BlankLineTable;
    use crate::format::options::IndentStyle;

    fn fixtures() -> (FormatOptions, Comments, SkipRegions, BlankLineTable, BlankLineTable) {
        (
            FormatOptions::default(),
            Comments::default(),
            SkipRegions::default(),
            BlankLineTable::top_level(),
            BlankLineTable::nested(),
        )
    }

    #[test]
    fn test_child_context_indents_with_tabs() {
        let (options, comments, skip, top, nested) = fixtures();
        let lines: Vec<&str> = Vec::new();
        let ctx = Context::root("", &lines, &options, &comments, &skip, &top, &nested);
        assert_eq!(ctx.indent_string, "");

        let child = ctx.create_child_context(3);
        assert_eq!(child.indent_string, "\t");
        assert_eq!(child.previously_processed_line, 3);

        let grandchild = child.create_child_context(5);
        assert_eq!(grandchild.indent_string, "\t\t");
    }

    #[test]
    fn test_child_context_indents_with_spaces() {
        let (mut options, comments, skip, top, nested) = fixtures();
        options.indent_style = IndentStyle::Spaces(7);
        let lines: Vec<&str> = Vec::new();
        let ctx = Context::root("", &lines, &options, &comments, &skip, &top, &nested);
        let child = ctx.create_child_context(1);
        assert_eq!(child.indent_string, "       ");
        assert_eq!(child.create_child_context(1).indent_string.len(), 14);
    }

    #[test]
    fn test_scope_table_selection() {
        let (options, comments, skip, top, nested) = fixtures();
        let lines: Vec<&str> = Vec::new();
        let ctx = Context::root("", &lines, &options, &comments, &skip, &top, &nested);
        assert_eq!(
            ctx.surrounding_empty_lines_for_scope()
                .required(crate::format::Category::Func, crate::format::Category::Func),
            2
        );
        let child = ctx.create_child_context(0);
        assert_eq!(
            child
                .surrounding_empty_lines_for_scope()
                .required(crate::format::Category::Func, crate::format::Category::Func),
            1
        );
    }
}
