//! Structural AST comparison backing the formatter's safety check.
//!
//! Input and output are reparsed and compared node by node, ignoring
//! whitespace and positions. Comments live outside this comparison (they are
//! reattached from a separate index), and parentheses are transparent: the
//! wrapper inserts them when splitting long operator chains, so
//! `parenthesized_expression` nodes unwrap on both sides before comparing.

use tree_sitter::{Node, Tree};

/// Result of comparing two trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstCheckResult {
    Equivalent,
    /// The trees differ at the described path.
    Different { path: String, difference: String },
}

impl AstCheckResult {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, AstCheckResult::Equivalent)
    }
}

/// Node kinds whose text carries meaning and must match exactly.
fn is_value_node(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "name"
            | "integer"
            | "float"
            | "string"
            | "true"
            | "false"
            | "null"
            | "self"
            | "type"
    )
}

/// Compare two parsed trees for structural equivalence.
pub fn compare_ast_with_source(
    original_tree: &Tree,
    original_source: &str,
    formatted_tree: &Tree,
    formatted_source: &str,
) -> AstCheckResult {
    compare_nodes(
        original_tree.root_node(),
        original_source,
        formatted_tree.root_node(),
        formatted_source,
        String::new(),
    )
}

/// Strip layers the formatter is allowed to add or remove: parentheses
/// around a single expression.
fn unwrap_transparent(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        let mut cursor = current.walk();
        let inner: Vec<_> = current
            .named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .collect();
        match inner.as_slice() {
            [only] => current = *only,
            _ => break,
        }
    }
    current
}

fn comparable_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .map(unwrap_transparent)
        .collect()
}

fn compare_nodes(
    orig: Node<'_>,
    orig_source: &str,
    fmt: Node<'_>,
    fmt_source: &str,
    path: String,
) -> AstCheckResult {
    let orig = unwrap_transparent(orig);
    let fmt = unwrap_transparent(fmt);

    if orig.kind() != fmt.kind() {
        return AstCheckResult::Different {
            path,
            difference: format!("node kind differs: '{}' vs '{}'", orig.kind(), fmt.kind()),
        };
    }

    let orig_children = comparable_children(orig);
    let fmt_children = comparable_children(fmt);

    if orig_children.is_empty() && fmt_children.is_empty() && is_value_node(orig.kind()) {
        let orig_text = &orig_source[orig.start_byte()..orig.end_byte()];
        let fmt_text = &fmt_source[fmt.start_byte()..fmt.end_byte()];
        if orig_text != fmt_text {
            return AstCheckResult::Different {
                path,
                difference: format!(
                    "{} value differs: '{}' vs '{}'",
                    orig.kind(),
                    orig_text,
                    fmt_text
                ),
            };
        }
    }

    if orig_children.len() != fmt_children.len() {
        return AstCheckResult::Different {
            path,
            difference: format!(
                "named child count differs: {} vs {}",
                orig_children.len(),
                fmt_children.len()
            ),
        };
    }

    for (i, (orig_child, fmt_child)) in orig_children.iter().zip(fmt_children.iter()).enumerate() {
        let child_path = if path.is_empty() {
            format!("{}[{}]", orig_child.kind(), i)
        } else {
            format!("{}.{}[{}]", path, orig_child.kind(), i)
        };
        let result = compare_nodes(*orig_child, orig_source, *fmt_child, fmt_source, child_path);
        if !result.is_equivalent() {
            return result;
        }
    }

    AstCheckResult::Equivalent
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::{Parser, Tree};

    fn parse(source: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_gdscript::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_identical_code() {
        let source = "var x = 1\n";
        let tree1 = parse(source);
        let tree2 = parse(source);
        assert_eq!(
            compare_ast_with_source(&tree1, source, &tree2, source),
            AstCheckResult::Equivalent
        );
    }

    #[test]
    fn test_whitespace_difference() {
        let source1 = "var x=1\n";
        let source2 = "var x = 1\n";
        let tree1 = parse(source1);
        let tree2 = parse(source2);
        assert_eq!(
            compare_ast_with_source(&tree1, source1, &tree2, source2),
            AstCheckResult::Equivalent
        );
    }

    #[test]
    fn test_indentation_difference() {
        let source1 = "func foo():\n  pass\n";
        let source2 = "func foo():\n\tpass\n";
        let tree1 = parse(source1);
        let tree2 = parse(source2);
        assert_eq!(
            compare_ast_with_source(&tree1, source1, &tree2, source2),
            AstCheckResult::Equivalent
        );
    }

    #[test]
    fn test_added_parentheses_are_transparent() {
        let source1 = "var x = a and b and c\n";
        let source2 = "var x = (\n\ta\n\tand b\n\tand c\n)\n";
        let tree1 = parse(source1);
        let tree2 = parse(source2);
        assert_eq!(
            compare_ast_with_source(&tree1, source1, &tree2, source2),
            AstCheckResult::Equivalent
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        let source1 = "var x = 1\n";
        let source2 = "# note\nvar x = 1  # trailing\n";
        let tree1 = parse(source1);
        let tree2 = parse(source2);
        assert_eq!(
            compare_ast_with_source(&tree1, source1, &tree2, source2),
            AstCheckResult::Equivalent
        );
    }

    #[test]
    fn test_different_values() {
        let source1 = "var x = 1\n";
        let source2 = "var x = 2\n";
        let tree1 = parse(source1);
        let tree2 = parse(source2);
        assert!(!compare_ast_with_source(&tree1, source1, &tree2, source2).is_equivalent());
    }

    #[test]
    fn test_different_identifiers() {
        let source1 = "var x = 1\n";
        let source2 = "var y = 1\n";
        let tree1 = parse(source1);
        let tree2 = parse(source2);
        assert!(!compare_ast_with_source(&tree1, source1, &tree2, source2).is_equivalent());
    }

    #[test]
    fn test_different_structure() {
        let source1 = "var x = 1\n";
        let source2 = "var x: int = 1\n";
        let tree1 = parse(source1);
        let tree2 = parse(source2);
        assert!(!compare_ast_with_source(&tree1, source1, &tree2, source2).is_equivalent());
    }

    #[test]
    fn test_multiline_vs_singleline_dict() {
        let source1 = "var d = {a: 1, b: 2}\n";
        let source2 = "var d = {\n\ta: 1,\n\tb: 2,\n}\n";
        let tree1 = parse(source1);
        let tree2 = parse(source2);
        assert_eq!(
            compare_ast_with_source(&tree1, source1, &tree2, source2),
            AstCheckResult::Equivalent
        );
    }

    #[test]
    fn test_function_with_different_spacing() {
        let source1 = "func foo(a:int,b:String)->void:\n\tpass\n";
        let source2 = "func foo(a: int, b: String) -> void:\n\tpass\n";
        let tree1 = parse(source1);
        let tree2 = parse(source2);
        assert_eq!(
            compare_ast_with_source(&tree1, source1, &tree2, source2),
            AstCheckResult::Equivalent
        );
    }
}
