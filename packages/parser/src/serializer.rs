use crate::ast::*;

/// Serializer converts a tree back to source text
///
/// Trivia nodes carry the original whitespace and comments verbatim, so
/// serializing an unedited tree reproduces its input exactly. Edited
/// regions come out with whatever trivia the edit put there.
pub struct Serializer {
    output: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            output: String::with_capacity(capacity),
        }
    }

    /// Append a tree
    pub fn write_tree(&mut self, tree: &Tree) -> &mut Self {
        tree.root().write_to(&mut self.output);
        self
    }

    /// Append a single node
    pub fn write_node(&mut self, node: &Node) -> &mut Self {
        node.write_to(&mut self.output);
        self
    }

    pub fn finish(self) -> String {
        self.output
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a tree to source text
pub fn serialize(tree: &Tree) -> String {
    let mut serializer = Serializer::new();
    serializer.write_tree(tree);
    serializer.finish()
}
