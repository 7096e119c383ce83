use std::collections::HashMap;

use super::context::Context;

/// Construct category for blank-line policy lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Synthetic category for "nothing rendered yet in this scope".
    FileStart,
    ClassName,
    Extends,
    Annotation,
    Signal,
    Enum,
    Const,
    Var,
    Func,
    Class,
    Statement,
}

impl Category {
    /// Classify a tree-sitter node kind.
    pub fn of(kind: &str) -> Category {
        match kind {
            "class_name_statement" => Category::ClassName,
            "extends_statement" => Category::Extends,
            "annotation" | "annotations" => Category::Annotation,
            "signal_statement" => Category::Signal,
            "enum_definition" => Category::Enum,
            "const_statement" => Category::Const,
            "variable_statement" | "onready_variable_statement" | "export_variable_statement" => {
                Category::Var
            }
            "function_definition" | "constructor_definition" => Category::Func,
            "class_definition" => Category::Class,
            _ => Category::Statement,
        }
    }

    /// Parse a category name as used in configuration keys.
    pub fn parse(name: &str) -> Option<Category> {
        match name {
            "file_start" => Some(Category::FileStart),
            "class_name" => Some(Category::ClassName),
            "extends" => Some(Category::Extends),
            "annotation" => Some(Category::Annotation),
            "signal" => Some(Category::Signal),
            "enum" => Some(Category::Enum),
            "const" => Some(Category::Const),
            "var" => Some(Category::Var),
            "func" => Some(Category::Func),
            "class" => Some(Category::Class),
            "statement" => Some(Category::Statement),
            _ => None,
        }
    }
}

/// Required empty lines between adjacent constructs.
///
/// Explicit ordered-pair entries win; otherwise the count is the maximum of
/// the two per-category surrounding counts. `FileStart` pairs resolve to 0
/// unless listed, so no scope starts with synthetic blank lines.
#[derive(Debug, Clone, Default)]
pub struct BlankLineTable {
    pairs: HashMap<(Category, Category), usize>,
    surrounding: HashMap<Category, usize>,
}

impl BlankLineTable {
    /// Built-in table for top-level declarations.
    pub fn top_level() -> Self {
        let mut table = Self::default();
        table.set_surrounding(Category::Func, 2);
        table.set_surrounding(Category::Class, 2);
        table.set_surrounding(Category::Enum, 2);
        table
    }

    /// Built-in table for nested scopes (class and function bodies).
    pub fn nested() -> Self {
        let mut table = Self::default();
        table.set_surrounding(Category::Func, 1);
        table.set_surrounding(Category::Class, 1);
        table.set_surrounding(Category::Enum, 1);
        table
    }

    pub fn set_surrounding(&mut self, category: Category, count: usize) {
        self.surrounding.insert(category, count);
    }

    pub fn set_pair(&mut self, prev: Category, next: Category, count: usize) {
        self.pairs.insert((prev, next), count);
    }

    pub fn has_pair(&self, prev: Category, next: Category) -> bool {
        self.pairs.contains_key(&(prev, next))
    }

    /// Resolve the required count for a pair of adjacent categories.
    pub fn required(&self, prev: Category, next: Category) -> usize {
        if let Some(&count) = self.pairs.get(&(prev, next)) {
            return count;
        }
        if prev == Category::FileStart {
            return 0;
        }
        let before = self.surrounding.get(&prev).copied().unwrap_or(0);
        let after = self.surrounding.get(&next).copied().unwrap_or(0);
        before.max(after)
    }
}

/// Resolve the blank-line count for the scope the context is in, applying
/// the single-blank-lines clamp to anything not explicitly listed.
pub fn required_blank_lines(prev: Category, next: Category, ctx: &Context<'_>) -> usize {
    let table = ctx.surrounding_empty_lines_for_scope();
    let count = table.required(prev, next);
    if ctx.options.single_blank_lines && !table.has_pair(prev, next) {
        count.min(1)
    } else {
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_definitions_get_two() {
        let table = BlankLineTable::top_level();
        assert_eq!(table.required(Category::Func, Category::Func), 2);
        assert_eq!(table.required(Category::Var, Category::Func), 2);
        assert_eq!(table.required(Category::Class, Category::Var), 2);
    }

    #[test]
    fn test_plain_statements_get_none() {
        let table = BlankLineTable::top_level();
        assert_eq!(table.required(Category::Var, Category::Var), 0);
        assert_eq!(table.required(Category::Extends, Category::Signal), 0);
    }

    #[test]
    fn test_nested_definitions_get_one() {
        let table = BlankLineTable::nested();
        assert_eq!(table.required(Category::Func, Category::Func), 1);
        assert_eq!(table.required(Category::Var, Category::Func), 1);
    }

    #[test]
    fn test_file_start_is_zero() {
        let table = BlankLineTable::top_level();
        assert_eq!(table.required(Category::FileStart, Category::Func), 0);
    }

    #[test]
    fn test_explicit_pair_wins() {
        let mut table = BlankLineTable::top_level();
        table.set_pair(Category::Var, Category::Func, 0);
        assert_eq!(table.required(Category::Var, Category::Func), 0);
        assert_eq!(table.required(Category::Func, Category::Var), 2);
    }
}
