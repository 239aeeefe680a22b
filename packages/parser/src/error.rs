use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse failure with the byte offset it occurred at
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognized input at {pos}: {snippet:?}")]
    LexerError { pos: usize, snippet: String },

    #[error("Unclosed {delimiter} opened at {pos}")]
    Unclosed { pos: usize, delimiter: String },

    #[error("Mismatched delimiter at {pos}: expected {expected}, found {found}")]
    MismatchedDelimiter {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected {found} at {pos}")]
    UnexpectedClose { pos: usize, found: String },

    #[error("Missing form after {prefix} at {pos}")]
    MissingForm { pos: usize, prefix: String },

    #[error("Invalid literal at {pos}: {message}")]
    InvalidLiteral { pos: usize, message: String },
}

impl ParseError {
    pub fn lexer_error(pos: usize, snippet: impl Into<String>) -> Self {
        Self::LexerError {
            pos,
            snippet: snippet.into(),
        }
    }

    pub fn unclosed(pos: usize, delimiter: impl Into<String>) -> Self {
        Self::Unclosed {
            pos,
            delimiter: delimiter.into(),
        }
    }

    pub fn mismatched(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::MismatchedDelimiter {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_close(pos: usize, found: impl Into<String>) -> Self {
        Self::UnexpectedClose {
            pos,
            found: found.into(),
        }
    }

    pub fn missing_form(pos: usize, prefix: impl Into<String>) -> Self {
        Self::MissingForm {
            pos,
            prefix: prefix.into(),
        }
    }

    pub fn invalid_literal(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidLiteral {
            pos,
            message: message.into(),
        }
    }

    /// Byte offset of the failure
    pub fn position(&self) -> usize {
        match self {
            ParseError::LexerError { pos, .. }
            | ParseError::Unclosed { pos, .. }
            | ParseError::MismatchedDelimiter { pos, .. }
            | ParseError::UnexpectedClose { pos, .. }
            | ParseError::MissingForm { pos, .. }
            | ParseError::InvalidLiteral { pos, .. } => *pos,
        }
    }

    /// Short description without the position
    pub fn reason(&self) -> String {
        match self {
            ParseError::LexerError { snippet, .. } => format!("unrecognized input {:?}", snippet),
            ParseError::Unclosed { delimiter, .. } => format!("unclosed {}", delimiter),
            ParseError::MismatchedDelimiter { expected, found, .. } => {
                format!("expected {}, found {}", expected, found)
            }
            ParseError::UnexpectedClose { found, .. } => format!("unexpected {}", found),
            ParseError::MissingForm { prefix, .. } => format!("missing form after {}", prefix),
            ParseError::InvalidLiteral { message, .. } => message.clone(),
        }
    }

    /// Line and column (both 1-based) of the failure within `source`
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let pos = self.position().min(source.len());
        let before = &source[..floor_char_boundary(source, pos)];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map(|nl| before[nl + 1..].chars().count())
            .unwrap_or_else(|| before.chars().count())
            + 1;
        (line, column)
    }
}

fn floor_char_boundary(source: &str, mut pos: usize) -> usize {
    while pos > 0 && !source.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Character range of the offending character; ariadne counts chars, not bytes
#[cfg_attr(not(feature = "pretty-errors"), allow(dead_code))]
fn char_span(source: &str, error: &ParseError) -> std::ops::Range<usize> {
    let start = floor_char_boundary(source, error.position().min(source.len()));
    let start_char = source[..start].chars().count();
    match source[start..].chars().next() {
        Some(_) => start_char..start_char + 1,
        None => start_char..start_char,
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = char_span(source, error);
    let mut output = Vec::new();
    let report = Report::build(ReportKind::Error, filename, span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, span))
                .with_color(Color::Red)
                .with_message(error.reason()),
        )
        .finish();

    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}
