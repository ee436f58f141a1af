// Call graph structures.
// Represents the containment tree of modules and their call edges.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::domain::module::{Module, ModuleId};
use crate::domain::node_key::FileId;

/// The finished call graph of one analysis run.
#[derive(Debug, Clone)]
pub struct CallGraph {
    root_modules: Vec<ModuleId>,
    module_map: IndexMap<ModuleId, Module>,
    files: Vec<PathBuf>,
}

impl CallGraph {
    pub fn new(
        root_modules: Vec<ModuleId>,
        module_map: IndexMap<ModuleId, Module>,
        files: Vec<PathBuf>,
    ) -> Self {
        Self {
            root_modules,
            module_map,
            files,
        }
    }

    /// File modules, one per analyzed file, in input order.
    pub fn root_modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.root_modules.iter().filter_map(|id| self.module_map.get(id))
    }

    pub fn root_ids(&self) -> &[ModuleId] {
        &self.root_modules
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.module_map.get(&id)
    }

    /// Every module, in creation order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.module_map.values()
    }

    pub fn children<'a>(&'a self, module: &'a Module) -> impl Iterator<Item = &'a Module> + 'a {
        module.children.iter().filter_map(|id| self.module_map.get(id))
    }

    pub fn called<'a>(&'a self, module: &'a Module) -> impl Iterator<Item = &'a Module> + 'a {
        module
            .called_modules
            .iter()
            .filter_map(|id| self.module_map.get(id))
    }

    pub fn len(&self) -> usize {
        self.module_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.module_map.is_empty()
    }

    /// Total number of call edges (call sites) in the graph.
    pub fn edge_count(&self) -> usize {
        self.module_map
            .values()
            .map(|m| m.called_modules.len())
            .sum()
    }

    pub fn find_by_name(&self, name: &str) -> Vec<&Module> {
        self.module_map
            .values()
            .filter(|m| m.name.as_deref() == Some(name))
            .collect()
    }

    /// Modules with at least one call edge to `target`.
    pub fn callers_of(&self, target: ModuleId) -> Vec<&Module> {
        self.module_map
            .values()
            .filter(|m| m.called_modules.contains(&target))
            .collect()
    }

    /// All strict descendants of `id`, depth-first pre-order.
    pub fn descendants(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut out = Vec::new();
        let mut stack: Vec<ModuleId> = match self.module_map.get(&id) {
            Some(m) => m.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(m) = self.module_map.get(&next) {
                stack.extend(m.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn file_path(&self, file: FileId) -> Option<&Path> {
        self.files.get(file.index()).map(PathBuf::as_path)
    }

    /// `path:line` of a module's defining node.
    pub fn location(&self, module: &Module) -> String {
        match self.file_path(module.span.file) {
            Some(path) => format!("{}:{}", path.display(), module.span.line),
            None => format!("?:{}", module.span.line),
        }
    }
}
