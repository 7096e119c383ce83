use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::blank_lines::{BlankLineTable, Category};

/// Indentation style for formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    #[default]
    Tabs,
    Spaces(usize),
}

impl IndentStyle {
    /// Get the string representation of one indent level.
    pub fn as_str(&self) -> String {
        match self {
            IndentStyle::Tabs => "\t".to_string(),
            IndentStyle::Spaces(n) => " ".repeat(*n),
        }
    }

    /// Get the visual width of one indent level (for line length calculation).
    pub fn width(&self) -> usize {
        match self {
            IndentStyle::Tabs => 4, // Tab counts as 4 spaces for line length
            IndentStyle::Spaces(n) => *n,
        }
    }

    /// Indent depth units consumed by one level (columns per indent).
    pub fn single_indent_size(&self) -> usize {
        match self {
            IndentStyle::Tabs => 1,
            IndentStyle::Spaces(n) => (*n).max(1),
        }
    }
}

/// Formatting options, fixed for a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Indentation style (tabs or spaces).
    #[serde(default)]
    pub indent_style: IndentStyle,

    /// Maximum line length before breaking.
    #[serde(default = "default_line_length")]
    pub max_line_length: usize,

    /// Whether to ensure a trailing newline at end of file.
    #[serde(default = "default_true")]
    pub trailing_newline: bool,

    /// Collapse multi-blank-line requirements down to one.
    #[serde(default)]
    pub single_blank_lines: bool,

    /// Top-level blank-line override entries, keyed by category name
    /// (`"func"`) or ordered pair (`"class/func"`). Applies at file scope
    /// only; nested scopes always use the built-in table.
    #[serde(default)]
    pub global_blank_lines: HashMap<String, usize>,
}

fn default_line_length() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_style: IndentStyle::default(),
            max_line_length: default_line_length(),
            trailing_newline: true,
            single_blank_lines: false,
            global_blank_lines: HashMap::new(),
        }
    }
}

impl FormatOptions {
    /// Create options with spaces indentation.
    pub fn with_spaces(n: usize) -> Self {
        Self {
            indent_style: IndentStyle::Spaces(n),
            ..Default::default()
        }
    }

    /// Build the blank-line table used at file scope, with the global
    /// override entries applied. Unknown category names are ignored.
    pub fn top_level_table(&self) -> BlankLineTable {
        let mut table = BlankLineTable::top_level();
        for (key, &count) in &self.global_blank_lines {
            if let Some((prev, next)) = key.split_once('/') {
                if let (Some(prev), Some(next)) =
                    (Category::parse(prev.trim()), Category::parse(next.trim()))
                {
                    table.set_pair(prev, next, count);
                }
            } else if let Some(category) = Category::parse(key.trim()) {
                table.set_surrounding(category, count);
            }
        }
        table
    }

    /// Calculate the visual width of a string (tabs count as indent width).
    pub fn visual_width(&self, s: &str) -> usize {
        let tab_width = self.indent_style.width();
        s.chars()
            .map(|c| if c == '\t' { tab_width } else { 1 })
            .sum()
    }
}
