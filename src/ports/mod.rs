use std::io::Write;

use tree_sitter::Node;

use crate::domain::callgraph::CallGraph;
use crate::domain::node_key::NodeKey;
use crate::domain::source::SourceFile;

/// Symbol lookup used by the call resolver.
///
/// Given an expression or name node in `file`, return the declaration nodes
/// its symbol ultimately refers to, with import and re-export aliases already
/// followed back to the original declaration. Order matters: callers take the
/// first declaration they recognize. An empty result means "unresolved".
pub trait SymbolResolver {
    fn declarations_of(&self, file: &SourceFile, node: Node<'_>) -> Vec<NodeKey>;
}

pub trait GraphExporter {
    fn export(&self, graph: &CallGraph, out: &mut dyn Write) -> std::io::Result<()>;
}
