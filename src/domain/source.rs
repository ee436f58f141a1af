// Parsed source files: text, language and tree-sitter tree for one input.

use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser, Tree};

use crate::domain::language::Language;
use crate::domain::node_key::{FileId, NodeKey};
use crate::error::AnalyzeError;

/// One parsed input file.
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    pub language: Language,
    pub text: String,
    tree: Tree,
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("language", &self.language)
            .finish()
    }
}

impl SourceFile {
    /// Parse `text` with the grammar for `language`.
    ///
    /// tree-sitter is error tolerant: syntax errors leave ERROR nodes in the
    /// tree rather than failing, and the tree is analyzed as-is.
    pub fn parse(
        id: FileId,
        path: impl Into<PathBuf>,
        text: String,
        language: Language,
    ) -> Result<Self, AnalyzeError> {
        let path = path.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| AnalyzeError::Grammar {
                language,
                message: e.to_string(),
            })?;
        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| AnalyzeError::Parse { path: path.clone() })?;

        if tree.root_node().has_error() {
            tracing::debug!(path = %path.display(), "syntax errors present, continuing with partial tree");
        }

        Ok(Self {
            id,
            path,
            language,
            text,
            tree,
        })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text_of(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.text.as_bytes()).unwrap_or("")
    }

    pub fn key(&self, node: Node<'_>) -> NodeKey {
        NodeKey::of(self.id, node)
    }

    /// Find the node a key was taken from, if it belongs to this file.
    pub fn node_at(&self, key: NodeKey) -> Option<Node<'_>> {
        if key.file != self.id {
            return None;
        }
        let mut node = self
            .tree
            .root_node()
            .descendant_for_byte_range(key.start, key.end)?;
        // The smallest spanning node may be a same-range descendant; climb to the kind.
        loop {
            if node.kind_id() == key.kind
                && node.start_byte() == key.start
                && node.end_byte() == key.end
            {
                return Some(node);
            }
            let parent = node.parent()?;
            if parent.start_byte() != key.start || parent.end_byte() != key.end {
                return None;
            }
            node = parent;
        }
    }

    /// 1-based line of a node's first byte.
    pub fn line_of(&self, node: Node<'_>) -> usize {
        node.start_position().row + 1
    }
}
