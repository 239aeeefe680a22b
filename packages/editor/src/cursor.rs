//! # Cursor
//!
//! A zipper over an immutable [`Tree`]. The cursor holds the node it points
//! at plus one frame per ancestor; edits replace the current node or its
//! parent's child list and leave every other subtree shared with the tree
//! the cursor came from.
//!
//! The cursor only ever rests on forms. Whitespace and comments are
//! skipped by navigation and kept in place by edits.

use paren_parser::{tokenize, CompositeKind, Node, NodeRef, Tree};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("Current node is not a composite")]
    NotComposite,

    #[error("Composite has no children")]
    EmptyComposite,

    #[error("Already at the root")]
    AtRoot,

    #[error("No sibling in that direction")]
    NoSibling,

    #[error("A {0} form wraps a fixed number of forms")]
    FixedArity(&'static str),

    #[error("Whitespace and comments cannot be edited as forms")]
    NotAForm,
}

pub type CursorResult<T> = Result<T, CursorError>;

/// One ancestor level: the parent as last written and our index in it
#[derive(Debug, Clone)]
struct Frame {
    parent: NodeRef,
    index: usize,
}

/// Navigable, editable position within a tree
#[derive(Debug, Clone)]
pub struct Cursor {
    node: NodeRef,
    path: Vec<Frame>,
}

impl Cursor {
    /// Cursor at the document root
    pub fn new(tree: &Tree) -> Self {
        Self {
            node: tree.root().clone(),
            path: Vec::new(),
        }
    }

    /// Cursor at the node reached by following significant-child indices
    pub fn at_path(tree: &Tree, path: &[usize]) -> CursorResult<Self> {
        let mut cursor = Self::new(tree);
        for &index in path {
            cursor = cursor.down()?;
            for _ in 0..index {
                cursor = cursor.right()?;
            }
        }
        Ok(cursor)
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The whole tree with all edits applied
    pub fn tree(&self) -> Tree {
        Tree::new(self.root().node)
    }

    /// Significant-child indices from the root to the current node
    pub fn path(&self) -> Vec<usize> {
        self.path
            .iter()
            .map(|frame| significant_index(frame.parent.children(), frame.index))
            .collect()
    }

    /// Ancestors from the root down to the direct parent
    pub fn ancestors(&self) -> impl Iterator<Item = &NodeRef> {
        self.path.iter().map(|frame| &frame.parent)
    }

    /// Byte offset of the current node in the serialized tree
    pub fn offset(&self) -> usize {
        self.path
            .iter()
            .map(|frame| {
                let open = match frame.parent.as_ref() {
                    Node::Composite(c) => c.kind.open_len(),
                    _ => 0,
                };
                let children = frame.parent.children();
                let before: usize = children[..frame.index]
                    .iter()
                    .enumerate()
                    .map(|(i, child)| {
                        // the serializer ends a comment that runs into the next node
                        let terminated = child.is_comment() && !children[i + 1].starts_with_newline();
                        child.text_len() + usize::from(terminated)
                    })
                    .sum();
                open + before
            })
            .sum()
    }

    // Navigation

    pub fn down(&self) -> CursorResult<Cursor> {
        let composite = self.node.as_composite().ok_or(CursorError::NotComposite)?;
        let index = composite
            .children
            .iter()
            .position(|child| !child.is_trivia())
            .ok_or(CursorError::EmptyComposite)?;
        Ok(self.child_at(index))
    }

    pub fn up(&self) -> CursorResult<Cursor> {
        let frame = self.path.last().ok_or(CursorError::AtRoot)?;
        let mut path = self.path.clone();
        path.pop();
        Ok(Cursor {
            node: with_child(&frame.parent, frame.index, &self.node),
            path,
        })
    }

    pub fn right(&self) -> CursorResult<Cursor> {
        let frame = self.path.last().ok_or(CursorError::NoSibling)?;
        let index = frame.parent.children()[frame.index + 1..]
            .iter()
            .position(|child| !child.is_trivia())
            .map(|offset| frame.index + 1 + offset)
            .ok_or(CursorError::NoSibling)?;
        Ok(self.move_to_sibling(index))
    }

    pub fn left(&self) -> CursorResult<Cursor> {
        let frame = self.path.last().ok_or(CursorError::NoSibling)?;
        let index = frame.parent.children()[..frame.index]
            .iter()
            .rposition(|child| !child.is_trivia())
            .ok_or(CursorError::NoSibling)?;
        Ok(self.move_to_sibling(index))
    }

    /// First sibling (the current node if it is already first)
    pub fn leftmost(&self) -> Cursor {
        match self.path.last() {
            Some(frame) => match frame.parent.children().iter().position(|c| !c.is_trivia()) {
                Some(index) => self.move_to_sibling(index),
                None => self.clone(),
            },
            None => self.clone(),
        }
    }

    /// Last sibling (the current node if it is already last)
    pub fn rightmost(&self) -> Cursor {
        match self.path.last() {
            Some(frame) => match frame.parent.children().iter().rposition(|c| !c.is_trivia()) {
                Some(index) => self.move_to_sibling(index),
                None => self.clone(),
            },
            None => self.clone(),
        }
    }

    pub fn root(&self) -> Cursor {
        let mut current = self.clone();
        while let Ok(parent) = current.up() {
            current = parent;
        }
        current
    }

    /// Next node in depth-first document order, `None` past the last node
    pub fn next(&self) -> Option<Cursor> {
        if let Ok(child) = self.down() {
            return Some(child);
        }
        let mut current = self.clone();
        loop {
            if let Ok(sibling) = current.right() {
                return Some(sibling);
            }
            current = current.up().ok()?;
        }
    }

    /// Previous node in depth-first document order, `None` at the root
    pub fn prev(&self) -> Option<Cursor> {
        match self.left() {
            Ok(mut current) => {
                while let Ok(child) = current.down() {
                    current = child.rightmost();
                }
                Some(current)
            }
            Err(_) => self.up().ok(),
        }
    }

    // Edits

    /// Substitute the current node; the cursor moves to the replacement
    ///
    /// Replacing the root with a single form makes that form the only
    /// top-level form of the document.
    pub fn replace(&self, node: NodeRef) -> CursorResult<Cursor> {
        ensure_form(&node)?;
        let frame = match self.path.last() {
            Some(frame) => frame,
            None if is_root_node(&node) => {
                return Ok(Cursor {
                    node,
                    path: Vec::new(),
                })
            }
            None => {
                let root = Arc::new(Node::composite(CompositeKind::Root, vec![node]));
                return Ok(Cursor {
                    node: root,
                    path: Vec::new(),
                });
            }
        };

        let mut children = frame.parent.children().to_vec();
        children[frame.index] = node.clone();
        let mut index = frame.index;
        if keep_apart(&frame.parent, &mut children, index) {
            index += 1;
        }
        keep_apart(&frame.parent, &mut children, index + 1);

        let mut cursor = Cursor {
            node,
            path: self.path.clone(),
        };
        if let Some(last) = cursor.path.last_mut() {
            last.parent = rebuild(&frame.parent, children);
            last.index = index;
        }
        cursor.keep_apart_from_following();
        Ok(cursor)
    }

    /// Add a sibling before the current node; the cursor stays put
    pub fn insert_before(&self, node: NodeRef) -> CursorResult<Cursor> {
        ensure_form(&node)?;
        let frame = self.path.last().ok_or(CursorError::AtRoot)?;
        ensure_variadic(&frame.parent)?;

        let mut children = frame.parent.children().to_vec();
        children[frame.index] = self.node.clone();
        let separator = separator_before(&frame.parent, &children, frame.index);
        children.splice(frame.index..frame.index, [node, separator]);
        let mut index = frame.index + 2;
        if keep_apart(&frame.parent, &mut children, frame.index) {
            index += 1;
        }

        Ok(self.with_parent(rebuild(&frame.parent, children), index))
    }

    /// Add a sibling after the current node; the cursor stays put
    pub fn insert_after(&self, node: NodeRef) -> CursorResult<Cursor> {
        ensure_form(&node)?;
        let frame = self.path.last().ok_or(CursorError::AtRoot)?;
        ensure_variadic(&frame.parent)?;

        let mut children = frame.parent.children().to_vec();
        children[frame.index] = self.node.clone();
        let separator = separator_before(&frame.parent, &children, frame.index);
        children.splice(frame.index + 1..frame.index + 1, [separator, node]);
        keep_apart(&frame.parent, &mut children, frame.index + 3);

        Ok(self.with_parent(rebuild(&frame.parent, children), frame.index))
    }

    /// Add `node` as the first child of the current composite
    pub fn insert_child(&self, node: NodeRef) -> CursorResult<Cursor> {
        ensure_form(&node)?;
        let mut children = self.editable_children()?;
        match children.iter().position(|c| !c.is_trivia()) {
            Some(first) => {
                let separator = separator_before(&self.node, &children, first);
                children.splice(first..first, [node, separator]);
            }
            None => children.insert(0, node),
        }
        Ok(Cursor {
            node: rebuild(&self.node, children),
            path: self.path.clone(),
        })
    }

    /// Add `node` as the last child of the current composite
    pub fn append_child(&self, node: NodeRef) -> CursorResult<Cursor> {
        ensure_form(&node)?;
        let mut children = self.editable_children()?;
        match children.iter().rposition(|c| !c.is_trivia()) {
            Some(last) => {
                let separator = separator_before(&self.node, &children, last);
                children.splice(last + 1..last + 1, [separator, node]);
            }
            None => children.insert(0, node),
        }
        Ok(Cursor {
            node: rebuild(&self.node, children),
            path: self.path.clone(),
        })
    }

    /// Delete the current node along with the whitespace that separated it
    ///
    /// The cursor moves to the following sibling, else the preceding one,
    /// else the parent.
    pub fn remove(&self) -> CursorResult<Cursor> {
        let frame = self.path.last().ok_or(CursorError::AtRoot)?;
        ensure_variadic(&frame.parent)?;

        let children = frame.parent.children();
        let index = frame.index;
        let has_left = children[..index].iter().any(|c| !c.is_trivia());
        let has_right = children[index + 1..].iter().any(|c| !c.is_trivia());

        let mut start = index;
        let mut end = index + 1;
        if has_left || !has_right {
            while start > 0 && children[start - 1].is_whitespace() {
                start -= 1;
            }
        }
        if !has_left {
            while end < children.len() && children[end].is_whitespace() {
                end += 1;
            }
        }

        let mut kept = children[..start].to_vec();
        kept.extend_from_slice(&children[end..]);
        keep_apart(&frame.parent, &mut kept, start);

        let mut path = self.path.clone();
        path.pop();
        let parent = Cursor {
            node: rebuild(&frame.parent, kept),
            path,
        };

        let siblings = parent.node.children();
        if let Some(next) = (start..siblings.len()).find(|&i| !siblings[i].is_trivia()) {
            return Ok(parent.child_at(next));
        }
        if let Some(prev) = (0..start).rev().find(|&i| !siblings[i].is_trivia()) {
            return Ok(parent.child_at(prev));
        }
        Ok(parent)
    }

    fn child_at(&self, index: usize) -> Cursor {
        let mut path = self.path.clone();
        path.push(Frame {
            parent: self.node.clone(),
            index,
        });
        Cursor {
            node: self.node.children()[index].clone(),
            path,
        }
    }

    fn move_to_sibling(&self, index: usize) -> Cursor {
        let mut path = self.path.clone();
        match path.last_mut() {
            Some(frame) => {
                frame.parent = with_child(&frame.parent, frame.index, &self.node);
                frame.index = index;
                let node = frame.parent.children()[index].clone();
                Cursor { node, path }
            }
            None => self.clone(),
        }
    }

    /// Same node, with the direct parent swapped for an edited one
    fn with_parent(&self, parent: NodeRef, index: usize) -> Cursor {
        let mut path = self.path.clone();
        if let Some(frame) = path.last_mut() {
            frame.parent = parent;
            frame.index = index;
        }
        Cursor {
            node: self.node.clone(),
            path,
        }
    }

    /// Separate a node that ends a prefix form from whatever follows the
    /// prefix form, which may be several levels up
    fn keep_apart_from_following(&mut self) {
        let tail = tail_text(&self.node);
        for (level, frame) in self.path.iter_mut().rev().enumerate() {
            let right = match frame.parent.children().get(frame.index + 1) {
                Some(next) if next.is_trivia() => return,
                Some(next) => head_text(next),
                None => close_text(&frame.parent).to_string(),
            };
            if right.is_empty() {
                continue;
            }
            // the innermost level was handled by the edit itself
            if level > 0 && fuses(&tail, &right) {
                let mut children = frame.parent.children().to_vec();
                children.insert(frame.index + 1, Arc::new(Node::space()));
                frame.parent = rebuild(&frame.parent, children);
            }
            return;
        }
    }

    fn editable_children(&self) -> CursorResult<Vec<NodeRef>> {
        let composite = self.node.as_composite().ok_or(CursorError::NotComposite)?;
        ensure_variadic(&self.node)?;
        Ok(composite.children.clone())
    }
}

fn is_root_node(node: &Node) -> bool {
    matches!(node, Node::Composite(c) if c.kind == CompositeKind::Root)
}

fn ensure_form(node: &Node) -> CursorResult<()> {
    if node.is_trivia() {
        return Err(CursorError::NotAForm);
    }
    Ok(())
}

/// Prefix forms (quote, metadata...) cannot gain or lose children
fn ensure_variadic(parent: &Node) -> CursorResult<()> {
    match parent {
        Node::Composite(c) if c.kind.is_prefix() => Err(CursorError::FixedArity(c.kind.name())),
        _ => Ok(()),
    }
}

/// Whitespace to put between a new node and the node at `index`
///
/// Reuses the line break and indentation in front of the reference node
/// when there is one, so multi-line forms stay multi-line.
fn separator_before(parent: &Node, children: &[NodeRef], index: usize) -> NodeRef {
    if index > 0 {
        let previous = &children[index - 1];
        if let Node::Trivia(trivia) = previous.as_ref() {
            if previous.is_whitespace() && trivia.contains_newline() {
                return previous.clone();
            }
        }
    }
    if is_root_node(parent) {
        Arc::new(Node::newline(0))
    } else {
        Arc::new(Node::space())
    }
}

/// Put a space at raw position `index` of `children` when the text on
/// either side of it would otherwise read back as different tokens
///
/// Returns whether a space was inserted.
pub(crate) fn keep_apart(parent: &Node, children: &mut Vec<NodeRef>, index: usize) -> bool {
    let left = match index.checked_sub(1).and_then(|i| children.get(i)) {
        Some(node) if node.is_trivia() => return false,
        Some(node) => tail_text(node),
        None => open_text(parent),
    };
    let right = match children.get(index) {
        Some(node) if node.is_trivia() => return false,
        Some(node) => head_text(node),
        None => close_text(parent).to_string(),
    };
    if fuses(&left, &right) {
        children.insert(index, Arc::new(Node::space()));
        true
    } else {
        false
    }
}

/// Whether `left` written directly before `right` lexes differently than
/// the two lexed apart, as in `#inst` + `x` or `~` + `@x`
fn fuses(left: &str, right: &str) -> bool {
    if left.is_empty() || right.is_empty() {
        return false;
    }
    let joined = format!("{}{}", left, right);
    let together: Vec<_> = tokenize(&joined).into_iter().map(|(token, _)| token).collect();
    let mut apart: Vec<_> = tokenize(left).into_iter().map(|(token, _)| token).collect();
    apart.extend(tokenize(right).into_iter().map(|(token, _)| token));
    together != apart
}

fn open_text(node: &Node) -> String {
    let mut open = String::new();
    if let Node::Composite(c) = node {
        c.kind.write_open(&mut open);
    }
    open
}

fn close_text(node: &Node) -> &'static str {
    match node {
        Node::Composite(c) => c.kind.close(),
        _ => "",
    }
}

/// Text of the first token `node` writes
fn head_text(node: &Node) -> String {
    match node {
        Node::Composite(c) => {
            let open = open_text(node);
            if open.is_empty() {
                c.children.first().map(|child| head_text(child)).unwrap_or_default()
            } else {
                open
            }
        }
        other => other.to_source(),
    }
}

/// Text of the last token `node` writes
fn tail_text(node: &Node) -> String {
    match node {
        Node::Composite(c) if c.kind.close().is_empty() => match c.children.last() {
            Some(child) => tail_text(child),
            None => open_text(node),
        },
        Node::Composite(c) => c.kind.close().to_string(),
        other => other.to_source(),
    }
}

fn significant_index(children: &[NodeRef], index: usize) -> usize {
    children[..index].iter().filter(|c| !c.is_trivia()).count()
}

fn rebuild(parent: &Node, children: Vec<NodeRef>) -> NodeRef {
    match parent {
        Node::Composite(c) => Arc::new(Node::composite(c.kind.clone(), children)),
        other => Arc::new(other.clone()),
    }
}

/// `parent` with `child` at `index`, reusing `parent` when nothing changed
fn with_child(parent: &NodeRef, index: usize, child: &NodeRef) -> NodeRef {
    match parent.children().get(index) {
        Some(existing) if Arc::ptr_eq(existing, child) => parent.clone(),
        _ => {
            let mut children = parent.children().to_vec();
            children[index] = child.clone();
            rebuild(parent, children)
        }
    }
}
