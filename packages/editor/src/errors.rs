//! Error types for the editor

use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] paren_parser::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cursor error: {0}")]
    Cursor(#[from] crate::cursor::CursorError),

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Session already exists: {0}")]
    DuplicateId(String),

    #[error("Invalid fragment: {0}")]
    InvalidFragment(String),

    #[error("Fragment holds {0} forms, expected exactly one")]
    MultipleNodes(usize),

    #[error("No enclosing scope to bind in")]
    NoEnclosingScope,

    #[error("A binding name or pattern cannot be extracted")]
    BindingName,

    #[error("Current form is not a call with a nested call argument")]
    NotNestedCall,

    #[error("Search query must not be empty")]
    EmptyQuery,

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    #[error("No match for '{0}'")]
    NoMatch(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

