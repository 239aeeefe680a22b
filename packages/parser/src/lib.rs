//! # Paren Parser
//!
//! Lossless parser for Clojure-style s-expression source.
//!
//! ```text
//! source text ──tokenize──▶ tokens ──parse──▶ Tree ──serialize──▶ source text
//! ```
//!
//! Whitespace and comments are kept as trivia nodes, so
//! `serialize(&parse(text)?) == text` for every input that parses.

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use ast::{Atom, AtomKind, Composite, CompositeKind, Node, NodeRef, NumberHint, Tree, Trivia, TriviaKind};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_atom, parse_forms, Parser};
pub use serializer::{serialize, Serializer};
pub use tokenizer::{tokenize, Token};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_basic() {
        let source = "(defn f [])";
        let tokens = tokenize(source);
        assert_eq!(tokens.len(), 8);
    }
}
