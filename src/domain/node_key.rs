// Structural identity for syntax nodes.
// Keys are plain values so two independent lookups of the same construct agree.

use tree_sitter::Node;

/// Index of a source file within one analysis run (input order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a syntax node: owning file, byte range and grammar kind.
///
/// The kind id disambiguates a node from a wrapper or child covering the same
/// bytes (a `program` holding a single declaration, for example).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
    pub kind: u16,
}

impl NodeKey {
    pub fn of(file: FileId, node: Node<'_>) -> Self {
        Self {
            file,
            start: node.start_byte(),
            end: node.end_byte(),
            kind: node.kind_id(),
        }
    }
}
