//! # Paren Editor
//!
//! Structural editing engine for s-expression source.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source text → Tree (lossless)       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor                                      │
//! │  - Cursor: zipper navigation + local edits  │
//! │  - Matcher: symbol/keyword search           │
//! │  - Transforms: replace, bulk replace,       │
//! │    extract-to-let, call-to-pipeline         │
//! │  - Sessions: named documents, undo, save    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ serializer: Tree → source text              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Trees are values**: every edit yields a new tree sharing all
//!    untouched subtrees with the old one
//! 2. **Always well-formed**: edits work on nodes, never on text, so the
//!    output always has balanced delimiters
//! 3. **All or nothing**: a failed operation leaves the session unchanged
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paren_editor::{MatchOptions, SessionManager, ThreadStyle};
//!
//! let manager = SessionManager::new();
//! manager.create("core", "src/app/core.clj", true)?;
//!
//! let renamed = manager.bulk_replace("core", "old-name", "new-name", MatchOptions::default())?;
//!
//! manager.goto("core", &[2, 3])?;
//! manager.extract_to_let("core", "total")?;
//!
//! manager.save("core", None)?;
//! ```

mod config;
mod cursor;
mod document;
mod errors;
mod extract;
mod matcher;
mod mutations;
mod pipeline;
mod session;
mod summary;
mod transforms;
mod undo_stack;

pub use config::EditorConfig;
pub use cursor::{Cursor, CursorError, CursorResult};
pub use document::{Document, Origin};
pub use errors::{EditorError, EditorResult};
pub use extract::extract_to_let;
pub use matcher::{find_matches, find_next, Match, MatchOptions, SymbolMatcher};
pub use mutations::{Applied, Direction, Mutation, MutationResult};
pub use pipeline::{thread, ThreadStyle};
pub use session::{SaveOutcome, Session, SessionInfo, SessionManager};
pub use summary::{head_symbol, path_steps, path_summary, preview, Location, NodeSummary, PathStep};
pub use transforms::{bulk_replace, parse_fragment, replace_node};
pub use undo_stack::UndoStack;

// Re-export common types for convenience
pub use paren_parser::{parse, serialize, Node, NodeRef, ParseError, Tree};
