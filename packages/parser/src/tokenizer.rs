use logos::Logos;
use std::fmt;

/// Token types for Clojure-style s-expression source
///
/// Every byte of the input belongs to exactly one token: whitespace and
/// comments are tokens too, so the parser can keep them as trivia.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum Token<'src> {
    // Trivia (commas are whitespace)
    #[regex(r"[ \t\r\n\x0C,]+", |lex| lex.slice())]
    Whitespace(&'src str),

    #[regex(r";[^\n]*", |lex| lex.slice())]
    #[regex(r"#![^\n]*", |lex| lex.slice())]
    Comment(&'src str),

    // Delimiters
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("#{")]
    SetOpen,

    #[token("#(")]
    FnOpen,

    #[token("#?(")]
    ReaderConditional,

    #[token("#?@(")]
    ReaderConditionalSplicing,

    // `#:ns{` and `#::{`, the slice excludes the brace
    #[regex(r"#::?[^\s,()\[\]{}\x22;]*\{", |lex| { let s = lex.slice(); &s[..s.len() - 1] })]
    NamespacedMap(&'src str),

    // Reader macros
    #[token("'")]
    Quote,

    #[token("`")]
    SyntaxQuote,

    #[token("~")]
    Unquote,

    #[token("~@")]
    UnquoteSplicing,

    #[token("@")]
    Deref,

    #[token("^")]
    Meta,

    #[token("#'")]
    Var,

    #[token("#_")]
    Discard,

    #[regex(r"#[a-zA-Z][^\s,()\[\]{}\x22;]*", |lex| lex.slice())]
    Tag(&'src str),

    // Literals
    #[regex(r#""([^"\\]|\\(.|\n))*""#, |lex| lex.slice())]
    String(&'src str),

    #[regex(r#"#"([^"\\]|\\(.|\n))*""#, |lex| lex.slice())]
    Regex(&'src str),

    #[regex(
        r"\\(newline|space|tab|backspace|formfeed|return|u[0-9a-fA-F]{4}|o[0-7]{1,3}|.)",
        |lex| lex.slice()
    )]
    Char(&'src str),

    #[regex(r"##(Inf|-Inf|NaN)", |lex| lex.slice())]
    SymbolicValue(&'src str),

    // Symbols, keywords, numbers, booleans and nil share one lexical class;
    // the parser classifies them.
    #[regex(r"[^\s,()\[\]{}\x22;'`~@^\\#][^\s,()\[\]{}\x22;`~@^\\]*", |lex| lex.slice())]
    Bare(&'src str),
}

impl<'src> Token<'src> {
    /// Whether this token is whitespace or a comment
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace(_) | Token::Comment(_))
    }

    /// Whether this token closes a delimited form
    pub fn is_close(&self) -> bool {
        matches!(self, Token::RParen | Token::RBracket | Token::RBrace)
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Whitespace(_) => write!(f, "whitespace"),
            Token::Comment(_) => write!(f, "comment"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::SetOpen => write!(f, "'#{{'"),
            Token::FnOpen => write!(f, "'#('"),
            Token::ReaderConditional => write!(f, "'#?('"),
            Token::ReaderConditionalSplicing => write!(f, "'#?@('"),
            Token::NamespacedMap(prefix) => write!(f, "'{}{{'", prefix),
            Token::Quote => write!(f, "quote"),
            Token::SyntaxQuote => write!(f, "syntax quote"),
            Token::Unquote => write!(f, "unquote"),
            Token::UnquoteSplicing => write!(f, "unquote-splicing"),
            Token::Deref => write!(f, "deref"),
            Token::Meta => write!(f, "metadata"),
            Token::Var => write!(f, "var quote"),
            Token::Discard => write!(f, "discard"),
            Token::Tag(t) => write!(f, "tag {}", t),
            Token::String(s) => write!(f, "string {}", s),
            Token::Regex(r) => write!(f, "regex {}", r),
            Token::Char(c) => write!(f, "character {}", c),
            Token::SymbolicValue(v) => write!(f, "value {}", v),
            Token::Bare(s) => write!(f, "'{}'", s),
        }
    }
}

/// Tokenize a source string
///
/// Unlike a skip-whitespace lexer this keeps every token, and a byte range
/// the lexer cannot match is returned as `Err(span)` so the parser can
/// report it instead of dropping it.
pub fn tokenize(source: &str) -> Vec<(Result<Token<'_>, ()>, std::ops::Range<usize>)> {
    Token::lexer(source).spanned().collect()
}
