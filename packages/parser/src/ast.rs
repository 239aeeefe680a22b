//! Tree model for parsed s-expression source.
//!
//! Nodes are immutable once built and shared through [`NodeRef`], so an
//! edited tree reuses every subtree that was not on the edit path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an immutable node
pub type NodeRef = Arc<Node>;

/// One syntactic unit of a parsed source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Composite(Composite),
    Atom(Atom),
    Trivia(Trivia),
}

/// Delimited (or prefixed) sequence of child nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    pub kind: CompositeKind,
    pub children: Vec<NodeRef>,
}

/// Kinds of composite nodes
///
/// Prefix kinds (quote, deref, metadata...) open with their sigil and have
/// an empty close delimiter; they wrap `arity()` significant children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeKind {
    /// Top-level document, no delimiters
    Root,
    List,
    Vector,
    Map,
    Set,
    /// Anonymous function literal `#( )`
    Fn,
    ReaderConditional,
    ReaderConditionalSplicing,
    /// `#:ns{ }`, holding the prefix without the brace
    NamespacedMap(String),
    Quote,
    SyntaxQuote,
    Unquote,
    UnquoteSplicing,
    Deref,
    Var,
    /// `^meta form`, two significant children
    Meta,
    Discard,
    /// Tagged literal such as `#inst "..."`, holding the tag
    Tagged(String),
}

impl CompositeKind {
    /// Opening text of this composite
    pub fn open(&self) -> &str {
        match self {
            CompositeKind::Root => "",
            CompositeKind::List => "(",
            CompositeKind::Vector => "[",
            CompositeKind::Map => "{",
            CompositeKind::Set => "#{",
            CompositeKind::Fn => "#(",
            CompositeKind::ReaderConditional => "#?(",
            CompositeKind::ReaderConditionalSplicing => "#?@(",
            CompositeKind::NamespacedMap(prefix) => prefix,
            CompositeKind::Quote => "'",
            CompositeKind::SyntaxQuote => "`",
            CompositeKind::Unquote => "~",
            CompositeKind::UnquoteSplicing => "~@",
            CompositeKind::Deref => "@",
            CompositeKind::Var => "#'",
            CompositeKind::Meta => "^",
            CompositeKind::Discard => "#_",
            CompositeKind::Tagged(tag) => tag,
        }
    }

    /// Closing text of this composite
    pub fn close(&self) -> &'static str {
        match self {
            CompositeKind::List
            | CompositeKind::Fn
            | CompositeKind::ReaderConditional
            | CompositeKind::ReaderConditionalSplicing => ")",
            CompositeKind::Vector => "]",
            CompositeKind::Map | CompositeKind::Set | CompositeKind::NamespacedMap(_) => "}",
            _ => "",
        }
    }

    /// Byte length of the opening text
    pub fn open_len(&self) -> usize {
        match self {
            CompositeKind::NamespacedMap(prefix) => prefix.len() + 1,
            other => other.open().len(),
        }
    }

    /// Append the opening text, brace included for namespaced maps
    pub fn write_open(&self, out: &mut String) {
        out.push_str(self.open());
        if let CompositeKind::NamespacedMap(_) = self {
            out.push('{');
        }
    }

    /// Whether this is a reader-macro prefix form
    pub fn is_prefix(&self) -> bool {
        self.arity().is_some()
    }

    /// Number of significant children a prefix form wraps
    pub fn arity(&self) -> Option<usize> {
        match self {
            CompositeKind::Meta => Some(2),
            CompositeKind::Quote
            | CompositeKind::SyntaxQuote
            | CompositeKind::Unquote
            | CompositeKind::UnquoteSplicing
            | CompositeKind::Deref
            | CompositeKind::Var
            | CompositeKind::Discard
            | CompositeKind::Tagged(_) => Some(1),
            _ => None,
        }
    }

    /// Short human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            CompositeKind::Root => "root",
            CompositeKind::List => "list",
            CompositeKind::Vector => "vector",
            CompositeKind::Map => "map",
            CompositeKind::Set => "set",
            CompositeKind::Fn => "fn",
            CompositeKind::ReaderConditional => "reader-conditional",
            CompositeKind::ReaderConditionalSplicing => "reader-conditional-splicing",
            CompositeKind::NamespacedMap(_) => "namespaced-map",
            CompositeKind::Quote => "quote",
            CompositeKind::SyntaxQuote => "syntax-quote",
            CompositeKind::Unquote => "unquote",
            CompositeKind::UnquoteSplicing => "unquote-splicing",
            CompositeKind::Deref => "deref",
            CompositeKind::Var => "var",
            CompositeKind::Meta => "meta",
            CompositeKind::Discard => "discard",
            CompositeKind::Tagged(_) => "tagged",
        }
    }
}

/// Literal leaf node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub kind: AtomKind,
    /// Exact source text, sigils and quotes included
    pub text: String,
    pub hint: Option<NumberHint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AtomKind {
    Symbol,
    Keyword,
    String,
    Regex,
    Character,
    Number,
    Boolean,
    Nil,
}

impl AtomKind {
    pub fn name(&self) -> &'static str {
        match self {
            AtomKind::Symbol => "symbol",
            AtomKind::Keyword => "keyword",
            AtomKind::String => "string",
            AtomKind::Regex => "regex",
            AtomKind::Character => "character",
            AtomKind::Number => "number",
            AtomKind::Boolean => "boolean",
            AtomKind::Nil => "nil",
        }
    }
}

/// How a number literal was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberHint {
    Decimal,
    Hex,
    Octal,
    Radix(u8),
    Ratio,
    Float,
    /// `##Inf`, `##-Inf`, `##NaN`
    Symbolic,
}

impl Atom {
    /// Keyword name with its leading colons removed; `None` for other kinds
    pub fn keyword_name(&self) -> Option<&str> {
        match self.kind {
            AtomKind::Keyword => Some(self.text.trim_start_matches(':')),
            _ => None,
        }
    }

    /// Leading colons of a keyword (`:` or `::`)
    pub fn keyword_sigil(&self) -> Option<&str> {
        self.keyword_name()
            .map(|name| &self.text[..self.text.len() - name.len()])
    }
}

/// Whitespace or comment text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriviaKind {
    Whitespace,
    Comment,
}

impl Trivia {
    pub fn contains_newline(&self) -> bool {
        self.text.contains('\n')
    }
}

impl Node {
    pub fn composite(kind: CompositeKind, children: Vec<NodeRef>) -> Node {
        Node::Composite(Composite { kind, children })
    }

    /// A single space
    pub fn space() -> Node {
        Node::Trivia(Trivia {
            kind: TriviaKind::Whitespace,
            text: " ".to_string(),
        })
    }

    /// A newline followed by `indent` spaces
    pub fn newline(indent: usize) -> Node {
        Node::Trivia(Trivia {
            kind: TriviaKind::Whitespace,
            text: format!("\n{}", " ".repeat(indent)),
        })
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self, Node::Trivia(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Node::Trivia(t) if t.kind == TriviaKind::Comment)
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Trivia(t) if t.kind == TriviaKind::Whitespace)
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Node::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Node::Atom(a) => Some(a),
            _ => None,
        }
    }

    /// Symbol text if this node is a symbol
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Node::Atom(a) if a.kind == AtomKind::Symbol => Some(&a.text),
            _ => None,
        }
    }

    /// Raw children including trivia; empty for atoms and trivia
    pub fn children(&self) -> &[NodeRef] {
        match self {
            Node::Composite(c) => &c.children,
            _ => &[],
        }
    }

    /// Kind name used in summaries
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Composite(c) => c.kind.name(),
            Node::Atom(a) => a.kind.name(),
            Node::Trivia(t) => match t.kind {
                TriviaKind::Whitespace => "whitespace",
                TriviaKind::Comment => "comment",
            },
        }
    }

    /// Append this node's source text to `out`
    ///
    /// A comment is always terminated before anything that follows it, so
    /// no edit can comment out a closing delimiter.
    pub fn write_to(&self, out: &mut String) {
        match self {
            Node::Atom(a) => out.push_str(&a.text),
            Node::Trivia(t) => out.push_str(&t.text),
            Node::Composite(c) => {
                c.kind.write_open(out);
                let close = c.kind.close();
                for (i, child) in c.children.iter().enumerate() {
                    child.write_to(out);
                    if child.is_comment() {
                        let follows = match c.children.get(i + 1) {
                            Some(next) => !next.starts_with_newline(),
                            None => !close.is_empty(),
                        };
                        if follows {
                            out.push('\n');
                        }
                    }
                }
                out.push_str(close);
            }
        }
    }

    /// Whether this is whitespace beginning with a line break
    pub fn starts_with_newline(&self) -> bool {
        match self {
            Node::Trivia(t) => t.text.starts_with('\n') || t.text.starts_with("\r\n"),
            _ => false,
        }
    }

    /// Source text of this node
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    /// Length in bytes of this node's source text
    pub fn text_len(&self) -> usize {
        match self {
            Node::Atom(a) => a.text.len(),
            Node::Trivia(t) => t.text.len(),
            Node::Composite(_) => self.to_source().len(),
        }
    }

    /// Significant (non-trivia) children with their raw indices
    pub fn significant_children(&self) -> impl Iterator<Item = (usize, &NodeRef)> {
        self.children()
            .iter()
            .enumerate()
            .filter(|(_, child)| !child.is_trivia())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

/// A parsed document
///
/// The root is always a [`CompositeKind::Root`] composite whose children
/// are the top-level forms and the trivia between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: NodeRef,
}

impl Tree {
    pub fn new(root: NodeRef) -> Self {
        Self { root }
    }

    pub fn empty() -> Self {
        Self::new(Arc::new(Node::composite(CompositeKind::Root, Vec::new())))
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// Top-level forms, trivia excluded
    pub fn forms(&self) -> impl Iterator<Item = &NodeRef> {
        self.root.children().iter().filter(|n| !n.is_trivia())
    }

    /// Whether two trees share the same root allocation
    pub fn ptr_eq(&self, other: &Tree) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}
