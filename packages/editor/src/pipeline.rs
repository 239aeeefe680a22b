//! # Call-to-pipeline
//!
//! Rewrites nested calls into a threading form, innermost call first:
//!
//! ```text
//! (f (g (h x) b) c)   =>   (-> x h (g b) (f c))      thread-first
//! (f a (g b (h x)))   =>   (->> x h (g b) (f a))     thread-last
//! ```
//!
//! Each step keeps the remaining arguments of its call in their original
//! order. A step left with only its head is written as the bare head.

use crate::cursor::{keep_apart, Cursor};
use crate::transforms::{spaced, symbol};
use crate::{EditorError, EditorResult};
use paren_parser::{CompositeKind, Node, NodeRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Which argument position the threaded value occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStyle {
    /// `->`, the nested call is the first argument
    #[default]
    First,
    /// `->>`, the nested call is the last argument
    Last,
}

impl ThreadStyle {
    pub fn arrow(&self) -> &'static str {
        match self {
            ThreadStyle::First => "->",
            ThreadStyle::Last => "->>",
        }
    }
}

/// Convert the nested call under the cursor into a pipeline
///
/// The cursor moves to the new threading form.
pub fn thread(cursor: &Cursor, style: ThreadStyle) -> EditorResult<Cursor> {
    let mut steps = Vec::new();
    let (step, mut current) = peel(cursor.node(), style).ok_or(EditorError::NotNestedCall)?;
    if !is_call(&current) {
        return Err(EditorError::NotNestedCall);
    }
    steps.push(step);

    while let Some((step, inner)) = peel(&current, style) {
        steps.push(step);
        current = inner;
    }

    debug!(style = style.arrow(), steps = steps.len(), "threading call");

    let mut items = Vec::with_capacity(steps.len() + 2);
    items.push(symbol(style.arrow()));
    items.push(current);
    items.extend(steps.into_iter().rev());

    Ok(cursor.replace(spaced(CompositeKind::List, items))?)
}

/// A list whose head is a symbol or keyword
fn is_call(node: &Node) -> bool {
    match node {
        Node::Composite(c) if c.kind == CompositeKind::List => node
            .significant_children()
            .next()
            .map_or(false, |(_, head)| is_callable(head)),
        _ => false,
    }
}

fn is_callable(node: &Node) -> bool {
    node.as_symbol().is_some() || node.as_atom().and_then(|a| a.keyword_name()).is_some()
}

/// Split a call into the step left after removing its threaded argument,
/// and that argument
fn peel(node: &Node, style: ThreadStyle) -> Option<(NodeRef, NodeRef)> {
    if !is_call(node) {
        return None;
    }
    let significant: Vec<(usize, &NodeRef)> = node.significant_children().collect();
    if significant.len() < 2 {
        return None;
    }
    let (index, argument) = match style {
        ThreadStyle::First => significant[1],
        ThreadStyle::Last => significant[significant.len() - 1],
    };
    let argument = argument.clone();

    let children = node.children();
    let mut start = index;
    while start > 0 && children[start - 1].is_whitespace() {
        start -= 1;
    }
    let mut remaining = children[..start].to_vec();
    remaining.extend_from_slice(&children[index + 1..]);
    keep_apart(node, &mut remaining, start);

    let head = significant[0].1;
    let bare = remaining.iter().filter(|c| !c.is_whitespace()).count() == 1;
    let step = if bare {
        head.clone()
    } else {
        Arc::new(Node::composite(CompositeKind::List, remaining))
    };
    Some((step, argument))
}
