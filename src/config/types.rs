use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::{FormatOptions, IndentStyle};

/// Project configuration, read from `gdfmt.toml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Path fragments to skip when walking directories.
    pub exclude: Vec<String>,
    pub format: FormatSection,
}

/// The `[format]` table. All keys are optional; anything absent falls back
/// to the built-in defaults, and command-line flags override everything.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FormatSection {
    /// `"tabs"` (default) or `"spaces"`.
    pub indent_using: Option<String>,
    /// Spaces per indent level when `indent_using = "spaces"`.
    pub indent_size: Option<usize>,
    pub line_length: Option<usize>,
    pub single_blank_lines: Option<bool>,
    /// Top-level blank-line overrides, keyed by category (`func = 1`) or
    /// ordered pair (`"class/func" = 0`).
    pub blank_lines: HashMap<String, usize>,
}

impl Config {
    /// Resolve final format options: defaults, then config values, then
    /// command-line overrides.
    pub fn format_options(
        &self,
        cli_spaces: Option<usize>,
        cli_line_length: Option<usize>,
        cli_single_blank_lines: bool,
    ) -> FormatOptions {
        let mut options = FormatOptions::default();

        if self.format.indent_using.as_deref() == Some("spaces") {
            options.indent_style = IndentStyle::Spaces(self.format.indent_size.unwrap_or(4));
        }
        if let Some(length) = self.format.line_length {
            options.max_line_length = length;
        }
        if let Some(single) = self.format.single_blank_lines {
            options.single_blank_lines = single;
        }
        options.global_blank_lines = self.format.blank_lines.clone();

        if let Some(spaces) = cli_spaces {
            options.indent_style = IndentStyle::Spaces(spaces);
        }
        if let Some(length) = cli_line_length {
            options.max_line_length = length;
        }
        if cli_single_blank_lines {
            options.single_blank_lines = true;
        }

        options
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude
            .iter()
            .any(|pattern| path_str.contains(pattern.trim_matches('*')))
    }
}
