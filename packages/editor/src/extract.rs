//! # Extract to let
//!
//! Binds the expression under the cursor to a new name in the innermost
//! enclosing binding form (`let` by default) and leaves a reference to the
//! name where the expression was. Only the occurrence under the cursor is
//! rewritten.
//!
//! - Expression in the body: the binding is appended to the binding vector.
//! - Expression inside the binding vector: the binding goes in front of the
//!   pair that uses it, so it is in scope there.
//! - No binding form around it: the enclosing top-level form is wrapped in
//!   a new `(let [name expr] ...)`.

use crate::config::EditorConfig;
use crate::cursor::Cursor;
use crate::transforms::{spaced, symbol};
use crate::{EditorError, EditorResult};
use paren_parser::{parse_atom, AtomKind, CompositeKind, Node, NodeRef};
use std::sync::Arc;
use tracing::debug;

/// Where the new binding goes
enum Site {
    /// Binding form at this depth; expression sits in its body
    Body { depth: usize },
    /// Binding form at this depth; expression sits in binding pair `pair`
    Bindings { depth: usize, pair: usize },
    /// Wrap the top-level form
    TopLevel,
}

/// Extract the node under the cursor into a binding called `name`
///
/// Returns a cursor on the binding form that now holds the binding.
pub fn extract_to_let(cursor: &Cursor, name: &str, config: &EditorConfig) -> EditorResult<Cursor> {
    if cursor.is_root() {
        return Err(EditorError::NoEnclosingScope);
    }
    match parse_atom(name) {
        Ok(atom) if atom.kind == AtomKind::Symbol => {}
        _ => {
            return Err(EditorError::InvalidFragment(format!(
                "binding name must be a symbol, got '{}'",
                name
            )))
        }
    }

    let expr = cursor.node().clone();
    let site = locate(cursor, config)?;
    let referenced = cursor.replace(symbol(name))?;

    let result = match site {
        Site::Body { depth } => {
            let vector = ascend(&referenced, depth)?.down()?.right()?;
            let vector = vector.replace(append_binding(vector.node(), name, expr))?;
            vector.up()?
        }
        Site::Bindings { depth, pair } => {
            let vector = ascend(&referenced, depth)?.down()?.right()?;
            let vector = vector.replace(insert_binding(vector.node(), pair, name, expr))?;
            vector.up()?
        }
        Site::TopLevel => {
            let top = ascend(&referenced, 1)?;
            let head = config.binding_forms.first().map(String::as_str).unwrap_or("let");
            let bindings = spaced(CompositeKind::Vector, vec![symbol(name), expr]);
            let body = top.node().clone();
            let separator = if body.to_source().contains('\n') {
                Node::newline(2)
            } else {
                Node::space()
            };
            let wrapped = Arc::new(Node::composite(
                CompositeKind::List,
                vec![
                    symbol(head),
                    Arc::new(Node::space()),
                    bindings,
                    Arc::new(separator),
                    body,
                ],
            ));
            top.replace(wrapped)?
        }
    };

    debug!(name, path = ?result.path(), "extracted binding");
    Ok(result)
}

/// Innermost binding form whose scope covers the cursor
fn locate(cursor: &Cursor, config: &EditorConfig) -> EditorResult<Site> {
    let path = cursor.path();
    let ancestors: Vec<&NodeRef> = cursor.ancestors().collect();

    for depth in (1..ancestors.len()).rev() {
        if !is_binding_form(ancestors[depth], config) {
            continue;
        }
        match path[depth] {
            0 => continue,
            // the binding vector itself is not extractable into itself
            1 if depth + 1 == path.len() => continue,
            // names and destructuring patterns sit at even positions
            1 if path[depth + 1] % 2 == 0 => return Err(EditorError::BindingName),
            1 => {
                return Ok(Site::Bindings {
                    depth,
                    pair: path[depth + 1] / 2,
                })
            }
            _ => return Ok(Site::Body { depth }),
        }
    }
    Ok(Site::TopLevel)
}

/// A list such as `(let [a 1] ...)`
fn is_binding_form(node: &Node, config: &EditorConfig) -> bool {
    let mut forms = node.significant_children().map(|(_, child)| child);
    let is_list = matches!(node, Node::Composite(c) if c.kind == CompositeKind::List);
    let head = forms.next().and_then(|head| head.as_symbol());
    let bindings = forms.next();
    is_list
        && head.map_or(false, |head| config.is_binding_form(head))
        && matches!(bindings.map(|b| b.as_ref()), Some(Node::Composite(c)) if c.kind == CompositeKind::Vector)
}

/// Walk up until the cursor sits at `depth`
fn ascend(cursor: &Cursor, depth: usize) -> EditorResult<Cursor> {
    let mut current = cursor.clone();
    while current.depth() > depth {
        current = current.up()?;
    }
    Ok(current)
}

/// Whitespace used between binding pairs: the break before the second pair
/// when bindings are laid out one per line, a space otherwise
fn pair_separator(vector: &Node) -> NodeRef {
    let children = vector.children();
    if let Some((index, _)) = vector.significant_children().nth(2) {
        if index > 0 {
            let previous = &children[index - 1];
            if let Node::Trivia(trivia) = previous.as_ref() {
                if previous.is_whitespace() && trivia.contains_newline() {
                    return previous.clone();
                }
            }
        }
    }
    Arc::new(Node::space())
}

fn append_binding(vector: &Node, name: &str, expr: NodeRef) -> NodeRef {
    let separator = pair_separator(vector);
    let mut children = vector.children().to_vec();
    let insert_at = match vector.significant_children().last() {
        Some((index, _)) => index + 1,
        None => 0,
    };

    let mut pair = Vec::with_capacity(4);
    if insert_at > 0 {
        pair.push(separator);
    }
    pair.extend([symbol(name), Arc::new(Node::space()), expr]);
    children.splice(insert_at..insert_at, pair);
    rebuild_vector(children)
}

fn insert_binding(vector: &Node, pair: usize, name: &str, expr: NodeRef) -> NodeRef {
    let separator = pair_separator(vector);
    let mut children = vector.children().to_vec();
    let insert_at = vector
        .significant_children()
        .nth(pair * 2)
        .map(|(index, _)| index)
        .unwrap_or(children.len());

    children.splice(
        insert_at..insert_at,
        [symbol(name), Arc::new(Node::space()), expr, separator],
    );
    rebuild_vector(children)
}

fn rebuild_vector(children: Vec<NodeRef>) -> NodeRef {
    Arc::new(Node::composite(CompositeKind::Vector, children))
}
