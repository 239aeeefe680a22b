use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::sync::Arc;

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[+-]?(0[xX][0-9a-fA-F]+N?|[0-9]{1,2}[rR][0-9a-zA-Z]+|[0-9]+/[0-9]+|[0-9]+N|[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?M?)$",
    )
    .expect("number pattern is valid")
});

/// Lossless parser for s-expression source
///
/// Every token, trivia included, ends up in the tree, which is what lets
/// [`crate::serialize`] reproduce the input byte for byte.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Result<Token<'src>, ()>, Range<usize>)>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
        }
    }

    /// Parse a complete document
    pub fn parse_document(&mut self) -> ParseResult<Tree> {
        let mut children = Vec::new();

        while let Some(token) = self.peek()? {
            if token.is_close() {
                return Err(ParseError::unexpected_close(self.peek_span().start, token.to_string()));
            }
            children.push(self.parse_node()?);
        }

        Ok(Tree::new(Arc::new(Node::composite(CompositeKind::Root, children))))
    }

    /// Parse one node (form or trivia) at the current position
    fn parse_node(&mut self) -> ParseResult<NodeRef> {
        let span = self.peek_span();
        let token = match self.advance()? {
            Some(token) => token,
            None => return Err(ParseError::unclosed(span.start, "form")),
        };

        let node = match token {
            Token::Whitespace(text) => Node::Trivia(Trivia {
                kind: TriviaKind::Whitespace,
                text: text.to_string(),
            }),
            Token::Comment(text) => Node::Trivia(Trivia {
                kind: TriviaKind::Comment,
                text: text.to_string(),
            }),

            Token::LParen => self.parse_delimited(CompositeKind::List, span.start)?,
            Token::LBracket => self.parse_delimited(CompositeKind::Vector, span.start)?,
            Token::LBrace => self.parse_delimited(CompositeKind::Map, span.start)?,
            Token::SetOpen => self.parse_delimited(CompositeKind::Set, span.start)?,
            Token::FnOpen => self.parse_delimited(CompositeKind::Fn, span.start)?,
            Token::ReaderConditional => {
                self.parse_delimited(CompositeKind::ReaderConditional, span.start)?
            }
            Token::ReaderConditionalSplicing => {
                self.parse_delimited(CompositeKind::ReaderConditionalSplicing, span.start)?
            }
            Token::NamespacedMap(prefix) => self.parse_delimited(
                CompositeKind::NamespacedMap(prefix.to_string()),
                span.start,
            )?,

            Token::Quote => self.parse_prefixed(CompositeKind::Quote, span.start)?,
            Token::SyntaxQuote => self.parse_prefixed(CompositeKind::SyntaxQuote, span.start)?,
            Token::Unquote => self.parse_prefixed(CompositeKind::Unquote, span.start)?,
            Token::UnquoteSplicing => {
                self.parse_prefixed(CompositeKind::UnquoteSplicing, span.start)?
            }
            Token::Deref => self.parse_prefixed(CompositeKind::Deref, span.start)?,
            Token::Meta => self.parse_prefixed(CompositeKind::Meta, span.start)?,
            Token::Var => self.parse_prefixed(CompositeKind::Var, span.start)?,
            Token::Discard => self.parse_prefixed(CompositeKind::Discard, span.start)?,
            Token::Tag(tag) => {
                self.parse_prefixed(CompositeKind::Tagged(tag.to_string()), span.start)?
            }

            Token::String(text) => atom(AtomKind::String, text, None),
            Token::Regex(text) => atom(AtomKind::Regex, text, None),
            Token::Char(text) => atom(AtomKind::Character, text, None),
            Token::SymbolicValue(text) => atom(AtomKind::Number, text, Some(NumberHint::Symbolic)),
            Token::Bare(text) => classify_bare(text, span.start)?,

            Token::RParen | Token::RBracket | Token::RBrace => {
                return Err(ParseError::unexpected_close(span.start, token.to_string()));
            }
        };

        Ok(Arc::new(node))
    }

    /// Parse children up to the closing delimiter matching `kind`
    fn parse_delimited(&mut self, kind: CompositeKind, open_pos: usize) -> ParseResult<Node> {
        let mut children = Vec::new();

        loop {
            match self.peek()? {
                None => {
                    let delimiter = format!("'{}'", kind_open_display(&kind));
                    return Err(ParseError::unclosed(open_pos, delimiter));
                }
                Some(token) if token.is_close() => {
                    let expected = kind.close();
                    let found = close_text(&token);
                    if found != expected {
                        return Err(ParseError::mismatched(
                            self.peek_span().start,
                            format!("'{}'", expected),
                            token.to_string(),
                        ));
                    }
                    self.advance()?;
                    return Ok(Node::composite(kind, children));
                }
                Some(_) => children.push(self.parse_node()?),
            }
        }
    }

    /// Parse the trivia and forms wrapped by a reader-macro prefix
    fn parse_prefixed(&mut self, kind: CompositeKind, open_pos: usize) -> ParseResult<Node> {
        let arity = kind.arity().unwrap_or(1);
        let mut children = Vec::new();
        let mut forms = 0;

        while forms < arity {
            match self.peek()? {
                Some(token) if !token.is_close() => {
                    if !token.is_trivia() {
                        forms += 1;
                    }
                    children.push(self.parse_node()?);
                }
                _ => return Err(ParseError::missing_form(open_pos, kind.name())),
            }
        }

        Ok(Node::composite(kind, children))
    }

    /// Peek the next token, reporting unrecognized input
    fn peek(&self) -> ParseResult<Option<Token<'src>>> {
        match self.tokens.get(self.pos) {
            None => Ok(None),
            Some((Ok(token), _)) => Ok(Some(*token)),
            Some((Err(()), span)) => Err(self.lexer_error(span.clone())),
        }
    }

    fn advance(&mut self) -> ParseResult<Option<Token<'src>>> {
        let token = self.peek()?;
        if token.is_some() {
            self.pos += 1;
        }
        Ok(token)
    }

    /// Span of the next token (end of input when exhausted)
    fn peek_span(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.clone())
            .unwrap_or(self.source.len()..self.source.len())
    }

    fn lexer_error(&self, span: Range<usize>) -> ParseError {
        let snippet: String = self.source[span.clone()].chars().take(16).collect();
        ParseError::lexer_error(span.start, snippet)
    }
}

fn kind_open_display(kind: &CompositeKind) -> String {
    match kind {
        CompositeKind::NamespacedMap(prefix) => format!("{}{{", prefix),
        other => other.open().to_string(),
    }
}

fn close_text(token: &Token) -> &'static str {
    match token {
        Token::RParen => ")",
        Token::RBracket => "]",
        Token::RBrace => "}",
        _ => "",
    }
}

fn atom(kind: AtomKind, text: &str, hint: Option<NumberHint>) -> Node {
    Node::Atom(Atom {
        kind,
        text: text.to_string(),
        hint,
    })
}

/// Split a bare word into symbol, keyword, number, boolean or nil
fn classify_bare(text: &str, pos: usize) -> ParseResult<Node> {
    if text.starts_with(':') {
        let name = text.trim_start_matches(':');
        if name.is_empty() || text.len() - name.len() > 2 || name.starts_with('/') {
            return Err(ParseError::invalid_literal(pos, format!("invalid keyword '{}'", text)));
        }
        return Ok(atom(AtomKind::Keyword, text, None));
    }

    if looks_numeric(text) {
        if !NUMBER.is_match(text) {
            return Err(ParseError::invalid_literal(pos, format!("invalid number '{}'", text)));
        }
        return Ok(atom(AtomKind::Number, text, Some(number_hint(text))));
    }

    Ok(match text {
        "nil" => atom(AtomKind::Nil, text, None),
        "true" | "false" => atom(AtomKind::Boolean, text, None),
        _ => atom(AtomKind::Symbol, text, None),
    })
}

fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    digits.starts_with(|c: char| c.is_ascii_digit())
}

fn number_hint(text: &str) -> NumberHint {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.starts_with("0x") || digits.starts_with("0X") {
        NumberHint::Hex
    } else if let Some(idx) = digits.find(['r', 'R']) {
        digits[..idx]
            .parse()
            .map(NumberHint::Radix)
            .unwrap_or(NumberHint::Decimal)
    } else if digits.contains('/') {
        NumberHint::Ratio
    } else if digits.contains(['.', 'e', 'E', 'M']) {
        NumberHint::Float
    } else if digits.len() > 1 && digits.starts_with('0') && !digits.ends_with('N') {
        NumberHint::Octal
    } else {
        NumberHint::Decimal
    }
}

/// Parse source text into a tree
pub fn parse(source: &str) -> ParseResult<Tree> {
    Parser::new(source).parse_document()
}

/// Parse a fragment that must hold exactly one form
///
/// Returns the significant nodes found, so callers can tell an empty
/// fragment from one holding several forms. Surrounding trivia is dropped.
pub fn parse_forms(source: &str) -> ParseResult<Vec<NodeRef>> {
    let tree = parse(source)?;
    Ok(tree.forms().cloned().collect())
}

/// Parse text that must be exactly one atom with no surrounding trivia
pub fn parse_atom(text: &str) -> ParseResult<Atom> {
    let tree = parse(text)?;
    match tree.root().children() {
        [single] => match single.as_ref() {
            Node::Atom(a) => Ok(a.clone()),
            other => Err(ParseError::invalid_literal(
                0,
                format!("expected an atom, found {}", other.kind_name()),
            )),
        },
        _ => Err(ParseError::invalid_literal(0, format!("expected a single atom, got '{}'", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::serialize;

    fn roundtrip(source: &str) {
        let tree = parse(source).unwrap_or_else(|e| panic!("parse failed for {:?}: {}", source, e));
        assert_eq!(serialize(&tree), source);
    }

    #[test]
    fn test_parse_simple_list() {
        let tree = parse("(foo bar)").unwrap();
        let forms: Vec<_> = tree.forms().collect();
        assert_eq!(forms.len(), 1);

        let list = forms[0].as_composite().unwrap();
        assert_eq!(list.kind, CompositeKind::List);
        assert_eq!(list.children.len(), 3);
        assert_eq!(list.children[0].as_symbol(), Some("foo"));
        assert!(list.children[1].is_whitespace());
    }

    #[test]
    fn test_atom_classification() {
        let tree = parse(":kw ::auto sym 42 0x1F 2r101 1/2 3.5e2 nil true \\c \"s\" #\"r\"").unwrap();
        let kinds: Vec<_> = tree
            .forms()
            .map(|n| n.as_atom().unwrap().kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                AtomKind::Keyword,
                AtomKind::Keyword,
                AtomKind::Symbol,
                AtomKind::Number,
                AtomKind::Number,
                AtomKind::Number,
                AtomKind::Number,
                AtomKind::Number,
                AtomKind::Nil,
                AtomKind::Boolean,
                AtomKind::Character,
                AtomKind::String,
                AtomKind::Regex,
            ]
        );
    }

    #[test]
    fn test_number_hints() {
        let hints: Vec<_> = parse("42 0x1F 2r101 1/2 3.5 017 ##NaN")
            .unwrap()
            .forms()
            .map(|n| n.as_atom().unwrap().hint)
            .collect();
        assert_eq!(
            hints,
            vec![
                Some(NumberHint::Decimal),
                Some(NumberHint::Hex),
                Some(NumberHint::Radix(2)),
                Some(NumberHint::Ratio),
                Some(NumberHint::Float),
                Some(NumberHint::Octal),
                Some(NumberHint::Symbolic),
            ]
        );
    }

    #[test]
    fn test_negative_number_and_minus_symbol() {
        let tree = parse("(- -1 +2)").unwrap();
        let list = tree.forms().next().unwrap();
        let atoms: Vec<_> = list
            .significant_children()
            .map(|(_, n)| n.as_atom().unwrap().kind)
            .collect();
        assert_eq!(atoms, vec![AtomKind::Symbol, AtomKind::Number, AtomKind::Number]);
    }

    #[test]
    fn test_roundtrip_preserves_everything() {
        roundtrip("");
        roundtrip("  \n");
        roundtrip("(defn foo\n  \"doc\"\n  [x]\n  ;; comment\n  (+ x 1))\n");
        roundtrip("(ns app.core\n  (:require [clojure.string :as str]))");
        roundtrip("{:a 1, :b [2 3] :c #{4}}");
        roundtrip("#(inc %) #?(:clj 1 :cljs 2) #?@(:clj [a])");
        roundtrip("'(1 2) `(a ~b ~@c) @state #'var ^:private x ^{:a 1} y #_ ignored");
        roundtrip("#inst \"2020-01-01\" #:person{:name \"x\"} #::{:a 1}");
        roundtrip("\\a \\newline \\u0041 \\( ##Inf");
        roundtrip("; trailing comment without newline");
    }

    #[test]
    fn test_unclosed_list() {
        let err = parse("(foo (bar)").unwrap_err();
        assert_eq!(err, ParseError::unclosed(0, "'('"));
    }

    #[test]
    fn test_mismatched_delimiter() {
        let err = parse("(foo]").unwrap_err();
        assert!(matches!(err, ParseError::MismatchedDelimiter { pos: 4, .. }));
    }

    #[test]
    fn test_stray_close_is_not_dropped() {
        let err = parse("(foo) )").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedClose { pos: 6, .. }));
    }

    #[test]
    fn test_invalid_literals() {
        assert!(matches!(parse("1abc"), Err(ParseError::InvalidLiteral { .. })));
        assert!(matches!(parse(":"), Err(ParseError::InvalidLiteral { .. })));
        assert!(matches!(parse("(a \"unterminated)"), Err(ParseError::LexerError { .. })));
    }

    #[test]
    fn test_prefix_without_form() {
        assert!(matches!(parse("(quote ')"), Err(ParseError::MissingForm { .. })));
        assert!(matches!(parse("^:meta"), Err(ParseError::MissingForm { .. })));
    }

    #[test]
    fn test_parse_forms_and_atom() {
        assert_eq!(parse_forms("  (a) b ").unwrap().len(), 2);
        assert_eq!(parse_atom(":k").unwrap().kind, AtomKind::Keyword);
        assert!(parse_atom("(a)").is_err());
        assert!(parse_atom(" a").is_err());
    }
}
