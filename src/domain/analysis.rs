//! Analysis run state.
//!
//! One `AnalysisRun` owns everything a run builds: the id counter, the
//! node→module map, the declaration index and the class→constructor index.
//! Modules are staged: Pass 1 records skeletons (kind, name, children),
//! Pass 2 records call edges, and [`AnalysisRun::finish`] assembles the
//! immutable [`Module`] records.

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::domain::call_resolver;
use crate::domain::callgraph::CallGraph;
use crate::domain::classifier;
use crate::domain::module::{Module, ModuleId, ModuleKind, SourceSpan};
use crate::domain::node_key::NodeKey;
use crate::domain::source::SourceFile;
use crate::ports::SymbolResolver;

#[derive(Debug)]
pub(crate) struct ModuleSkeleton {
    pub kind: ModuleKind,
    pub name: Option<String>,
    pub children: Vec<ModuleId>,
    pub span: SourceSpan,
}

#[derive(Debug, Default)]
pub struct AnalysisRun {
    next_id: u32,
    skeletons: IndexMap<ModuleId, ModuleSkeleton>,
    node_to_module: HashMap<NodeKey, ModuleId>,
    declarations: HashMap<NodeKey, ModuleId>,
    constructors: HashMap<ModuleId, ModuleId>,
    roots: Vec<ModuleId>,
    calls: HashMap<ModuleId, Vec<ModuleId>>,
}

impl AnalysisRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run both passes over `files` and assemble the graph.
    ///
    /// Pass 1 covers every file before Pass 2 starts, so cross-file lookups
    /// see the complete declaration index.
    pub fn analyze(files: &[SourceFile], resolver: &dyn SymbolResolver) -> CallGraph {
        let mut run = Self::new();
        for file in files {
            run.classify_file(file);
        }
        for file in files {
            run.resolve_file(file, resolver);
        }
        run.finish(files.iter().map(|f| f.path.clone()).collect())
    }

    /// Pass 1 over one file. Returns the file's root module.
    pub fn classify_file(&mut self, file: &SourceFile) -> ModuleId {
        let root = classifier::classify_file(self, file);
        self.roots.push(root);
        tracing::debug!(path = %file.path.display(), modules = self.skeletons.len(), "classified");
        root
    }

    /// Pass 2 over one file.
    pub fn resolve_file(&mut self, file: &SourceFile, resolver: &dyn SymbolResolver) {
        call_resolver::resolve_file(self, file, resolver);
        tracing::debug!(path = %file.path.display(), "calls resolved");
    }

    pub(crate) fn create_module(
        &mut self,
        kind: ModuleKind,
        name: Option<String>,
        node: NodeKey,
        declaration: Option<NodeKey>,
        line: usize,
    ) -> ModuleId {
        self.next_id += 1;
        let id = ModuleId(self.next_id);
        self.skeletons.insert(
            id,
            ModuleSkeleton {
                kind,
                name,
                children: Vec::new(),
                span: SourceSpan {
                    file: node.file,
                    start: node.start,
                    end: node.end,
                    line,
                },
            },
        );
        self.node_to_module.insert(node, id);
        if let Some(declaration) = declaration {
            self.declarations.insert(declaration, id);
        }
        id
    }

    pub(crate) fn set_children(&mut self, id: ModuleId, children: Vec<ModuleId>) {
        if let Some(skeleton) = self.skeletons.get_mut(&id) {
            skeleton.children = children;
        }
    }

    pub(crate) fn link_constructor(&mut self, class: ModuleId, constructor: ModuleId) {
        self.constructors.insert(class, constructor);
    }

    pub(crate) fn record_calls(&mut self, id: ModuleId, calls: Vec<ModuleId>) {
        self.calls.insert(id, calls);
    }

    pub fn module_for_node(&self, key: &NodeKey) -> Option<ModuleId> {
        self.node_to_module.get(key).copied()
    }

    pub fn module_for_declaration(&self, key: &NodeKey) -> Option<ModuleId> {
        self.declarations.get(key).copied()
    }

    pub fn constructor_of(&self, class: ModuleId) -> Option<ModuleId> {
        self.constructors.get(&class).copied()
    }

    pub fn kind_of(&self, id: ModuleId) -> Option<ModuleKind> {
        self.skeletons.get(&id).map(|s| s.kind)
    }

    pub fn module_count(&self) -> usize {
        self.skeletons.len()
    }

    /// Assemble the finished graph.
    pub fn finish(self, files: Vec<PathBuf>) -> CallGraph {
        let Self {
            skeletons,
            mut calls,
            roots,
            ..
        } = self;
        let module_map: IndexMap<ModuleId, Module> = skeletons
            .into_iter()
            .map(|(id, skeleton)| {
                let module = Module {
                    id,
                    kind: skeleton.kind,
                    name: skeleton.name,
                    children: skeleton.children,
                    called_modules: calls.remove(&id).unwrap_or_default(),
                    span: skeleton.span,
                };
                (id, module)
            })
            .collect();
        CallGraph::new(roots, module_map, files)
    }
}
