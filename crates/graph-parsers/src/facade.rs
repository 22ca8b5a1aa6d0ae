//! Grammar loading and tree production for a single `(source, language)` pair.
//!
//! Grounded on `treesitter/mod.rs`'s `TreeSitterParser`: one `tree_sitter::Parser`
//! reused across calls via `set_language`, since tree-sitter parsers are not
//! re-entrant but are cheap to retarget.

use graph_core::types::Language;
use tree_sitter::{Parser, Tree};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("grammar unavailable for language: {0:?}")]
    GrammarUnavailable(Language),
    #[error("parse failed")]
    ParseFailed,
}

/// Loads grammars on demand and parses source into a concrete syntax tree.
///
/// Not `Send`/`Sync` — the worker keeps one instance per file parsed serially,
/// matching the single-threaded cooperative execution model.
pub struct ParserFacade {
    parser: Parser,
}

impl ParserFacade {
    pub fn new() -> Self {
        Self { parser: Parser::new() }
    }

    pub fn parse(&mut self, source: &[u8], language: Language) -> Result<Tree, ParseError> {
        let grammar = language_grammar(language).ok_or(ParseError::GrammarUnavailable(language))?;
        self.parser
            .set_language(&grammar)
            .map_err(|_| ParseError::GrammarUnavailable(language))?;
        self.parser.parse(source, None).ok_or(ParseError::ParseFailed)
    }
}

impl Default for ParserFacade {
    fn default() -> Self {
        Self::new()
    }
}

fn language_grammar(language: Language) -> Option<tree_sitter::Language> {
    match language {
        Language::Typescript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Language::Tsx => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
        Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
        Language::C => Some(tree_sitter_c::LANGUAGE.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typescript_produces_tree_without_error() {
        let mut facade = ParserFacade::new();
        let tree = facade.parse(b"function f() { return 1; }", Language::Typescript).unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_parse_python_produces_tree() {
        let mut facade = ParserFacade::new();
        let tree = facade.parse(b"def f():\n    return 1\n", Language::Python).unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_parse_c_produces_tree() {
        let mut facade = ParserFacade::new();
        let tree = facade.parse(b"int f(void) { return 1; }", Language::C).unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_reusing_facade_across_languages_retargets_parser() {
        let mut facade = ParserFacade::new();
        facade.parse(b"def f(): pass", Language::Python).unwrap();
        let tree = facade.parse(b"function f() {}", Language::Typescript).unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_malformed_source_still_returns_tree() {
        // tree-sitter is error-tolerant; malformed input parses into an error-marked tree,
        // not a ParseError.
        let mut facade = ParserFacade::new();
        let tree = facade.parse(b"function f( {", Language::Typescript).unwrap();
        assert!(tree.root_node().has_error());
    }
}
