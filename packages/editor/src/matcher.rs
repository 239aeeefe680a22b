//! # Symbol Matcher
//!
//! Locates symbol and keyword atoms by name. Keywords are tried both on
//! their full text (`:user/id`) and on their name without the leading
//! colons (`user/id`), so one query covers a symbol and its keyword form.
//!
//! Matches are reported in depth-first, left-to-right document order.

use crate::cursor::Cursor;
use crate::summary::{Location, PositionTracker};
use crate::{EditorError, EditorResult};
use paren_parser::{Atom, AtomKind, Node, Tree};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Matching policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchOptions {
    /// Whole-text equality instead of substring containment
    pub exact_match: bool,
    pub case_sensitive: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            exact_match: true,
            case_sensitive: true,
        }
    }
}

impl MatchOptions {
    pub fn substring() -> Self {
        Self {
            exact_match: false,
            ..Self::default()
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.case_sensitive = false;
        self
    }
}

/// A matched atom and where it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub text: String,
    pub kind: AtomKind,
    pub location: Location,
}

/// Compiled query
#[derive(Debug, Clone)]
pub struct SymbolMatcher {
    query: String,
    options: MatchOptions,
    pattern: Regex,
}

impl SymbolMatcher {
    pub fn new(query: &str, options: MatchOptions) -> EditorResult<Self> {
        if query.is_empty() {
            return Err(EditorError::EmptyQuery);
        }

        let escaped = regex::escape(query);
        let source = if options.exact_match {
            format!("^(?:{})$", escaped)
        } else {
            escaped
        };
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|e| EditorError::InvalidQuery(e.to_string()))?;

        Ok(Self {
            query: query.to_string(),
            options,
            pattern,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    pub fn matches_atom(&self, atom: &Atom) -> bool {
        match atom.kind {
            AtomKind::Symbol => self.pattern.is_match(&atom.text),
            AtomKind::Keyword => {
                self.pattern.is_match(&atom.text)
                    || atom
                        .keyword_name()
                        .map_or(false, |name| self.pattern.is_match(name))
            }
            _ => false,
        }
    }

    pub fn matches(&self, node: &Node) -> bool {
        node.as_atom().map_or(false, |atom| self.matches_atom(atom))
    }

    /// New source text for a matched atom
    ///
    /// Keywords keep their colons unless the replacement supplies its own.
    pub fn rewrite(&self, atom: &Atom, replacement: &str) -> String {
        let sigil = atom.keyword_sigil();
        let name = atom.keyword_name();

        if self.options.exact_match {
            return match sigil {
                Some(sigil) if !replacement.starts_with(':') => format!("{}{}", sigil, replacement),
                _ => replacement.to_string(),
            };
        }

        match (sigil, name) {
            (Some(sigil), Some(name)) if self.pattern.is_match(name) => {
                let renamed = self.pattern.replace_all(name, NoExpand(replacement));
                if renamed.starts_with(':') {
                    renamed.into_owned()
                } else {
                    format!("{}{}", sigil, renamed)
                }
            }
            _ => self
                .pattern
                .replace_all(&atom.text, NoExpand(replacement))
                .into_owned(),
        }
    }
}

/// Every matching atom in `tree`, in document order
pub fn find_matches(tree: &Tree, matcher: &SymbolMatcher) -> Vec<Match> {
    let mut found = Vec::new();
    let mut tracker = PositionTracker::new();
    let mut path = Vec::new();
    collect(tree.root(), matcher, &mut path, &mut tracker, &mut found);
    found
}

fn collect(
    node: &Node,
    matcher: &SymbolMatcher,
    path: &mut Vec<usize>,
    tracker: &mut PositionTracker,
    found: &mut Vec<Match>,
) {
    match node {
        Node::Atom(atom) => {
            if matcher.matches_atom(atom) {
                found.push(Match {
                    text: atom.text.clone(),
                    kind: atom.kind,
                    location: tracker.location(path.clone()),
                });
            }
            tracker.advance(&atom.text);
        }
        Node::Trivia(trivia) => tracker.advance(&trivia.text),
        Node::Composite(composite) => {
            let mut open = String::new();
            composite.kind.write_open(&mut open);
            tracker.advance(&open);

            let close = composite.kind.close();
            let mut index = 0;
            for (i, child) in composite.children.iter().enumerate() {
                if child.is_trivia() {
                    collect(child, matcher, path, tracker, found);
                } else {
                    path.push(index);
                    collect(child, matcher, path, tracker, found);
                    path.pop();
                    index += 1;
                }
                // mirrors the comment terminator added on serialization
                if child.is_comment() {
                    let follows = match composite.children.get(i + 1) {
                        Some(next) => !next.starts_with_newline(),
                        None => !close.is_empty(),
                    };
                    if follows {
                        tracker.advance("\n");
                    }
                }
            }
            tracker.advance(close);
        }
    }
}

/// Move to the first match after the cursor, wrapping to the start
pub fn find_next(cursor: &Cursor, matcher: &SymbolMatcher) -> EditorResult<Cursor> {
    let tree = cursor.tree();
    let matches = find_matches(&tree, matcher);
    let current = cursor.path();

    let target = matches
        .iter()
        .find(|m| m.location.path > current)
        .or_else(|| matches.first())
        .ok_or_else(|| EditorError::NoMatch(matcher.query().to_string()))?;

    Ok(Cursor::at_path(&tree, &target.location.path)?)
}
