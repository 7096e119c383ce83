use thiserror::Error;
use tree_sitter::{Language, Parser, Tree};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("failed to load GDScript grammar: {0}")]
    Language(String),
    #[error("source is not valid GDScript")]
    Invalid,
}

pub fn language() -> Language {
    tree_sitter_gdscript::LANGUAGE.into()
}

/// Parse GDScript source into a tree-sitter tree.
///
/// tree-sitter always produces a tree, so a root containing error nodes is
/// what "failed to parse" means here.
pub fn parse(source: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .map_err(|e| ParseError::Language(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::Language("parser returned no tree".to_string()))?;
    if tree.root_node().has_error() {
        return Err(ParseError::Invalid);
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_source() {
        assert!(parse("var x = 1\n").is_ok());
        assert!(parse("pass\n").is_ok());
    }

    #[test]
    fn test_parse_invalid_source() {
        assert_eq!(parse("pass x").err(), Some(ParseError::Invalid));
    }

    #[test]
    fn test_parse_empty_source() {
        assert!(parse("").is_ok());
    }
}
