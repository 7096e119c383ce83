use once_cell::sync::Lazy;
use regex::Regex;

static FMT_OFF: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\s*fmt:\s*off").unwrap());
static FMT_ON: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\s*fmt:\s*on").unwrap());

/// Line ranges the formatter must leave untouched (# fmt: off/on).
#[derive(Debug, Default)]
pub struct SkipRegions {
    /// Inclusive 1-indexed (start, end) line ranges.
    ranges: Vec<(usize, usize)>,
}

impl SkipRegions {
    /// Scan the source for fmt: off/on markers. An unclosed `off` extends
    /// to the end of the file.
    pub fn parse(source: &str) -> Self {
        let mut ranges = Vec::new();
        let mut open: Option<usize> = None;
        let mut last_line = 0;

        for (idx, line) in source.lines().enumerate() {
            let line_num = idx + 1;
            last_line = line_num;

            if FMT_OFF.is_match(line) {
                open.get_or_insert(line_num);
            } else if FMT_ON.is_match(line) {
                if let Some(start) = open.take() {
                    ranges.push((start, line_num));
                }
            }
        }

        if let Some(start) = open {
            ranges.push((start, last_line));
        }

        Self { ranges }
    }

    /// Check if a line (1-indexed) lies inside a skip region.
    pub fn covers(&self, line: usize) -> bool {
        self.ranges
            .iter()
            .any(|&(start, end)| line >= start && line <= end)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
