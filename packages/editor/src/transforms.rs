//! Fragment replacement and bulk find/replace

use crate::cursor::Cursor;
use crate::matcher::{MatchOptions, SymbolMatcher};
use crate::{EditorError, EditorResult};
use paren_parser::{parse_atom, parse_forms, Atom, AtomKind, CompositeKind, Node, NodeRef};
use std::sync::Arc;
use tracing::debug;

/// Parse caller-supplied text that must hold exactly one form
pub fn parse_fragment(fragment: &str) -> EditorResult<NodeRef> {
    let mut forms = parse_forms(fragment).map_err(|e| EditorError::InvalidFragment(e.to_string()))?;
    match forms.len() {
        0 => Err(EditorError::InvalidFragment("fragment holds no form".to_string())),
        1 => Ok(forms.remove(0)),
        n => Err(EditorError::MultipleNodes(n)),
    }
}

/// Substitute the node at the cursor with a parsed fragment
pub fn replace_node(cursor: &Cursor, fragment: &str) -> EditorResult<Cursor> {
    let node = parse_fragment(fragment)?;
    Ok(cursor.replace(node)?)
}

/// Rename every matching atom; returns the edited cursor and the count
///
/// The walk re-derives each position from the tree produced by the
/// previous replacement. With no matches the input cursor comes back
/// untouched. The cursor keeps its path, since renaming atoms never
/// changes the shape of the tree.
pub fn bulk_replace(
    cursor: &Cursor,
    query: &str,
    replacement: &str,
    options: MatchOptions,
) -> EditorResult<(Cursor, usize)> {
    let matcher = SymbolMatcher::new(query, options)?;
    let mut current = cursor.root();
    let mut count = 0;

    loop {
        if let Node::Atom(atom) = current.node().as_ref() {
            if matcher.matches_atom(atom) {
                let text = matcher.rewrite(atom, replacement);
                if text != atom.text {
                    let renamed = parse_atom(&text)
                        .map_err(|e| EditorError::InvalidFragment(format!("{}: {}", text, e)))?;
                    current = current.replace(Arc::new(Node::Atom(renamed)))?;
                }
                count += 1;
            }
        }
        match current.next() {
            Some(next) => current = next,
            None => break,
        }
    }

    debug!(query, replacement, count, "bulk replace");
    if count == 0 {
        return Ok((cursor.clone(), 0));
    }

    let tree = current.tree();
    let restored = Cursor::at_path(&tree, &cursor.path()).unwrap_or_else(|_| Cursor::new(&tree));
    Ok((restored, count))
}

pub(crate) fn symbol(text: &str) -> NodeRef {
    Arc::new(Node::Atom(Atom {
        kind: AtomKind::Symbol,
        text: text.to_string(),
        hint: None,
    }))
}

/// Composite of `kind` with its items separated by single spaces
pub(crate) fn spaced(kind: CompositeKind, items: Vec<NodeRef>) -> NodeRef {
    let mut children = Vec::with_capacity(items.len() * 2);
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            children.push(Arc::new(Node::space()));
        }
        children.push(item);
    }
    Arc::new(Node::composite(kind, children))
}
