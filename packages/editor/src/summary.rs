//! Human-facing descriptions of cursor positions.

use crate::cursor::Cursor;
use paren_parser::Node;
use serde::{Deserialize, Serialize};

/// Where a node sits in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Significant-child indices from the root
    pub path: Vec<usize>,
    /// Byte offset into the serialized document
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Location {
    /// Location of the cursor's node, computed against the cursor's own tree
    pub fn of(cursor: &Cursor) -> Self {
        let source = cursor.tree().to_string();
        let mut tracker = PositionTracker::new();
        let offset = cursor.offset().min(source.len());
        tracker.advance(&source[..floor_char_boundary(&source, offset)]);
        tracker.location(cursor.path())
    }
}

/// Running byte offset and line/column while walking source text
#[derive(Debug, Clone)]
pub(crate) struct PositionTracker {
    offset: usize,
    line: usize,
    column: usize,
}

impl PositionTracker {
    pub(crate) fn new() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub(crate) fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += text.len();
    }

    pub(crate) fn location(&self, path: Vec<usize>) -> Location {
        Location {
            path,
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }
}

fn floor_char_boundary(source: &str, mut pos: usize) -> usize {
    while pos > 0 && !source.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Short description of the node under the cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub kind: String,
    /// Source text with whitespace collapsed, truncated to the summary width
    pub preview: String,
    pub location: Location,
}

impl NodeSummary {
    pub fn of(cursor: &Cursor, width: usize) -> Self {
        Self {
            kind: cursor.node().kind_name().to_string(),
            preview: preview(cursor.node(), width),
            location: Location::of(cursor),
        }
    }
}

/// One ancestor on the way from the root to the cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Significant-child index of the next step within this ancestor
    pub index: usize,
    pub kind: String,
    /// Head symbol for lists such as `(defn ...)`
    pub head: Option<String>,
}

/// Ancestors of the cursor, outermost first
pub fn path_steps(cursor: &Cursor) -> Vec<PathStep> {
    cursor
        .ancestors()
        .zip(cursor.path())
        .map(|(ancestor, index)| PathStep {
            index,
            kind: ancestor.kind_name().to_string(),
            head: head_symbol(ancestor).map(str::to_string),
        })
        .collect()
}

/// One-line rendering of a path, e.g. `root[0] > (defn)[3] > vector[1]`
pub fn path_summary(steps: &[PathStep]) -> String {
    steps
        .iter()
        .map(|step| match &step.head {
            Some(head) => format!("({})[{}]", head, step.index),
            None => format!("{}[{}]", step.kind, step.index),
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// First significant child of a list when it is a symbol
pub fn head_symbol(node: &Node) -> Option<&str> {
    match node {
        Node::Composite(c) if c.kind == paren_parser::CompositeKind::List => c
            .children
            .iter()
            .find(|child| !child.is_trivia())
            .and_then(|head| head.as_symbol()),
        _ => None,
    }
}

/// Source text with whitespace runs collapsed, cut at `width` characters
pub fn preview(node: &Node, width: usize) -> String {
    let collapsed = node.to_source().split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
