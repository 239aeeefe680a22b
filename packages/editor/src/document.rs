//! # Document
//!
//! A parsed source tree together with the cursor that edits it and a
//! record of where the source came from.
//!
//! Documents are values: applying a mutation produces a new document and
//! leaves the old one intact, sharing every untouched subtree. That is what
//! makes session commits atomic and undo history cheap.

use crate::cursor::Cursor;
use crate::mutations::Mutation;
use crate::{EditorConfig, EditorResult};
use paren_parser::{parse, serialize, Tree};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a document's source came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "snake_case")]
pub enum Origin {
    /// Literal text handed over by the caller
    Text,
    /// Read from this file
    File(PathBuf),
}

impl Origin {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Origin::File(path) => Some(path),
            Origin::Text => None,
        }
    }
}

/// Editable s-expression document
#[derive(Debug, Clone)]
pub struct Document {
    cursor: Cursor,
    origin: Origin,
}

impl Document {
    /// Parse literal source text
    pub fn from_source(source: &str) -> EditorResult<Self> {
        let tree = parse(source)?;
        Ok(Self {
            cursor: Cursor::new(&tree),
            origin: Origin::Text,
        })
    }

    /// Read and parse a file
    pub fn load(path: impl Into<PathBuf>) -> EditorResult<Self> {
        let path = path.into();
        let source = std::fs::read_to_string(&path)?;
        let tree = parse(&source)?;
        Ok(Self {
            cursor: Cursor::new(&tree),
            origin: Origin::File(path),
        })
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn tree(&self) -> Tree {
        self.cursor.tree()
    }

    /// Serialized source of the current tree
    pub fn source(&self) -> String {
        serialize(&self.tree())
    }

    /// Same origin, different cursor
    pub fn with_cursor(&self, cursor: Cursor) -> Self {
        Self {
            cursor,
            origin: self.origin.clone(),
        }
    }

    /// Apply a mutation, returning the new document and the replacement
    /// count for bulk replaces
    pub fn apply(&self, mutation: &Mutation, config: &EditorConfig) -> EditorResult<(Self, Option<usize>)> {
        let applied = mutation.apply(&self.cursor, config)?;
        Ok((self.with_cursor(applied.cursor), applied.replacements))
    }

    /// Whether `other` holds a different tree (not merely a moved cursor)
    pub fn tree_changed(&self, other: &Document) -> bool {
        !self.tree().ptr_eq(&other.tree())
    }

    /// Write the serialized tree to `path`
    pub fn save_to(&self, path: &Path) -> EditorResult<()> {
        std::fs::write(path, self.source())?;
        Ok(())
    }
}
