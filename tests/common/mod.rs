#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::{tempdir, TempDir};
use ts_callgraph::{analyze, CallGraph, Module, ModuleKind};

/// A throwaway project directory with a `tsconfig.json`.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempdir().unwrap();
        for (name, text) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, text).unwrap();
        }
        if !dir.path().join("tsconfig.json").exists() {
            fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();
        }
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config(&self) -> PathBuf {
        self.path("tsconfig.json")
    }

    pub fn analyze(&self, names: &[&str]) -> CallGraph {
        let paths: Vec<PathBuf> = names.iter().map(|n| self.path(n)).collect();
        analyze(paths.as_slice(), &self.config()).unwrap()
    }
}

/// The single module with this kind and name.
pub fn find<'g>(graph: &'g CallGraph, kind: ModuleKind, name: &str) -> &'g Module {
    let found: Vec<&Module> = graph
        .find_by_name(name)
        .into_iter()
        .filter(|m| m.kind == kind)
        .collect();
    assert_eq!(found.len(), 1, "expected one {kind} named {name}, found {}", found.len());
    found[0]
}

/// `kind name` for each call edge of `module`, in order.
pub fn calls(graph: &CallGraph, module: &Module) -> Vec<String> {
    graph
        .called(module)
        .map(|m| format!("{} {}", m.kind, m.label()))
        .collect()
}

pub fn root<'g>(graph: &'g CallGraph, index: usize) -> &'g Module {
    graph.root_modules().nth(index).unwrap()
}
