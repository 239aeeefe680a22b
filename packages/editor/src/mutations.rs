//! # Mutations
//!
//! Every cursor move and structural edit as a serializable operation, so a
//! transport can ship edits as JSON:
//!
//! ```json
//! [
//!   {"op": "goto", "path": [0, 3]},
//!   {"op": "extract_to_let", "name": "total"},
//!   {"op": "bulk_replace", "query": "foo", "replacement": "bar"}
//! ]
//! ```
//!
//! Applying a mutation is a pure function of the cursor: the input cursor
//! is never modified and a failure leaves nothing half-applied.

use crate::config::EditorConfig;
use crate::cursor::{Cursor, CursorError};
use crate::extract::extract_to_let;
use crate::matcher::{find_next, MatchOptions, SymbolMatcher};
use crate::pipeline::{thread, ThreadStyle};
use crate::summary::Location;
use crate::transforms::{bulk_replace, parse_fragment, replace_node};
use crate::EditorResult;
use serde::{Deserialize, Serialize};

/// Cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Down,
    Up,
    Left,
    Right,
    Root,
    Next,
    Prev,
    Leftmost,
    Rightmost,
}

/// Structural operations on a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Move the cursor one step
    Navigate { direction: Direction },

    /// Jump to the node at a significant-child path
    Goto { path: Vec<usize> },

    /// Replace the current node with a parsed fragment
    Replace { fragment: String },

    InsertBefore { fragment: String },

    InsertAfter { fragment: String },

    /// Insert as first child of the current composite
    InsertChild { fragment: String },

    /// Insert as last child of the current composite
    AppendChild { fragment: String },

    /// Delete the current node
    Remove,

    /// Rename every matching symbol and keyword
    BulkReplace {
        query: String,
        replacement: String,
        #[serde(default)]
        options: MatchOptions,
    },

    /// Bind the current node to `name` in the nearest binding form
    ExtractToLet { name: String },

    /// Turn a nested call into a threading pipeline
    Thread {
        #[serde(default)]
        style: ThreadStyle,
    },

    /// Move to the next matching symbol or keyword
    FindNext {
        query: String,
        #[serde(default)]
        options: MatchOptions,
    },
}

/// Cursor produced by a mutation
#[derive(Debug, Clone)]
pub struct Applied {
    pub cursor: Cursor,
    /// Set for bulk replaces
    pub replacements: Option<usize>,
}

impl From<Cursor> for Applied {
    fn from(cursor: Cursor) -> Self {
        Self {
            cursor,
            replacements: None,
        }
    }
}

/// Reported back to the caller once a mutation is committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    /// Session version after the commit
    pub version: u64,
    /// Replacement count for bulk replaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacements: Option<usize>,
    /// Where the cursor ended up
    pub location: Location,
}

impl Mutation {
    /// Run against `cursor`, producing the new cursor
    pub fn apply(&self, cursor: &Cursor, config: &EditorConfig) -> EditorResult<Applied> {
        let cursor = match self {
            Mutation::Navigate { direction } => navigate(cursor, *direction)?,
            Mutation::Goto { path } => Cursor::at_path(&cursor.tree(), path)?,
            Mutation::Replace { fragment } => replace_node(cursor, fragment)?,
            Mutation::InsertBefore { fragment } => cursor.insert_before(parse_fragment(fragment)?)?,
            Mutation::InsertAfter { fragment } => cursor.insert_after(parse_fragment(fragment)?)?,
            Mutation::InsertChild { fragment } => cursor.insert_child(parse_fragment(fragment)?)?,
            Mutation::AppendChild { fragment } => cursor.append_child(parse_fragment(fragment)?)?,
            Mutation::Remove => cursor.remove()?,
            Mutation::BulkReplace {
                query,
                replacement,
                options,
            } => {
                let (cursor, count) = bulk_replace(cursor, query, replacement, *options)?;
                return Ok(Applied {
                    cursor,
                    replacements: Some(count),
                });
            }
            Mutation::ExtractToLet { name } => extract_to_let(cursor, name, config)?,
            Mutation::Thread { style } => thread(cursor, *style)?,
            Mutation::FindNext { query, options } => {
                let matcher = SymbolMatcher::new(query, *options)?;
                find_next(cursor, &matcher)?
            }
        };
        Ok(cursor.into())
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Navigate { .. } => "navigate",
            Mutation::Goto { .. } => "goto",
            Mutation::Replace { .. } => "replace",
            Mutation::InsertBefore { .. } => "insert_before",
            Mutation::InsertAfter { .. } => "insert_after",
            Mutation::InsertChild { .. } => "insert_child",
            Mutation::AppendChild { .. } => "append_child",
            Mutation::Remove => "remove",
            Mutation::BulkReplace { .. } => "bulk_replace",
            Mutation::ExtractToLet { .. } => "extract_to_let",
            Mutation::Thread { .. } => "thread",
            Mutation::FindNext { .. } => "find_next",
        }
    }
}

fn navigate(cursor: &Cursor, direction: Direction) -> EditorResult<Cursor> {
    let moved = match direction {
        Direction::Down => cursor.down()?,
        Direction::Up => cursor.up()?,
        Direction::Left => cursor.left()?,
        Direction::Right => cursor.right()?,
        Direction::Root => cursor.root(),
        Direction::Leftmost => cursor.leftmost(),
        Direction::Rightmost => cursor.rightmost(),
        Direction::Next => cursor.next().ok_or(CursorError::NoSibling)?,
        Direction::Prev => cursor.prev().ok_or(CursorError::AtRoot)?,
    };
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorError;
    use paren_parser::parse;

    fn run(source: &str, mutations: &[Mutation]) -> EditorResult<Cursor> {
        let config = EditorConfig::default();
        let mut cursor = Cursor::new(&parse(source).unwrap());
        for mutation in mutations {
            cursor = mutation.apply(&cursor, &config)?.cursor;
        }
        Ok(cursor)
    }

    fn nav(direction: Direction) -> Mutation {
        Mutation::Navigate { direction }
    }

    #[test]
    fn test_json_shape() {
        let ops: Vec<Mutation> = serde_json::from_str(
            r#"[
                {"op": "navigate", "direction": "down"},
                {"op": "goto", "path": [0, 1]},
                {"op": "bulk_replace", "query": "a", "replacement": "b"},
                {"op": "thread", "style": "last"},
                {"op": "find_next", "query": "x", "options": {"exactMatch": false}},
                {"op": "remove"}
            ]"#,
        )
        .unwrap();

        assert_eq!(ops[0], nav(Direction::Down));
        assert_eq!(
            ops[2],
            Mutation::BulkReplace {
                query: "a".to_string(),
                replacement: "b".to_string(),
                options: MatchOptions::default(),
            }
        );
        assert_eq!(ops[3], Mutation::Thread { style: ThreadStyle::Last });
        match &ops[4] {
            Mutation::FindNext { options, .. } => {
                assert!(!options.exact_match);
                assert!(options.case_sensitive);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(ops[5], Mutation::Remove);
    }

    #[test]
    fn test_navigation_sequence() {
        let cursor = run(
            "(a [b c] d)",
            &[
                nav(Direction::Down),
                nav(Direction::Down),
                nav(Direction::Right),
                nav(Direction::Down),
                nav(Direction::Rightmost),
            ],
        )
        .unwrap();
        assert_eq!(cursor.node().to_source(), "c");
        assert_eq!(cursor.path(), vec![0, 1, 1]);
    }

    #[test]
    fn test_boundaries_are_errors() {
        assert!(matches!(
            run("(a)", &[nav(Direction::Up)]),
            Err(EditorError::Cursor(CursorError::AtRoot))
        ));
        assert!(matches!(
            run("(a)", &[nav(Direction::Down), nav(Direction::Right)]),
            Err(EditorError::Cursor(CursorError::NoSibling))
        ));
        assert!(matches!(
            run("a", &[nav(Direction::Down), nav(Direction::Down)]),
            Err(EditorError::Cursor(CursorError::NotComposite))
        ));
    }

    #[test]
    fn test_edit_sequence_stays_balanced() {
        let cursor = run(
            "(defn f [x]\n  ; body\n  (inc x))",
            &[
                Mutation::Goto { path: vec![0, 3] },
                Mutation::InsertBefore { fragment: "(println x)".to_string() },
                Mutation::Replace { fragment: "(dec x)".to_string() },
                Mutation::AppendChild { fragment: "1".to_string() },
                nav(Direction::Down),
                Mutation::Remove,
                Mutation::Remove,
                Mutation::Remove,
            ],
        )
        .unwrap();
        let text = cursor.tree().to_string();
        assert!(parse(&text).is_ok(), "unbalanced: {}", text);
        assert_eq!(text, "(defn f [x]\n  ; body\n  (println x)\n  ())");
    }

    #[test]
    fn test_bulk_replace_reports_count() {
        let config = EditorConfig::default();
        let cursor = Cursor::new(&parse("(foo foo)").unwrap());
        let applied = Mutation::BulkReplace {
            query: "foo".to_string(),
            replacement: "bar".to_string(),
            options: MatchOptions::default(),
        }
        .apply(&cursor, &config)
        .unwrap();
        assert_eq!(applied.replacements, Some(2));
    }

    #[test]
    fn test_failed_mutation_leaves_input_untouched() {
        let config = EditorConfig::default();
        let tree = parse("(a b)").unwrap();
        let cursor = Cursor::at_path(&tree, &[0, 0]).unwrap();
        let result = Mutation::Replace { fragment: "(x) (y)".to_string() }.apply(&cursor, &config);
        assert!(matches!(result, Err(EditorError::MultipleNodes(2))));
        assert!(cursor.tree().ptr_eq(&tree));
    }
}
