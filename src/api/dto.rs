use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::callgraph::CallGraph;
use crate::domain::module::{Module, ModuleKind};

/// Serialized call graph: nested trees from each file plus a flat id lookup.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallGraphDto {
    pub root_modules: Vec<ModuleTreeDto>,
    pub module_map: IndexMap<String, ModuleDto>,
}

/// A module in `moduleMap`; children are referenced by id.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ModuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub children: Vec<String>,
    pub called_modules: Vec<String>,
    pub location: String,
}

/// A module in `rootModules`; children are nested.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTreeDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ModuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub children: Vec<ModuleTreeDto>,
    pub called_modules: Vec<String>,
    pub location: String,
}

impl From<&CallGraph> for CallGraphDto {
    fn from(cg: &CallGraph) -> Self {
        let module_map = cg
            .modules()
            .map(|m| {
                let dto = ModuleDto {
                    id: m.id.to_string(),
                    kind: m.kind,
                    name: m.name.clone(),
                    children: m.children.iter().map(|c| c.to_string()).collect(),
                    called_modules: m.called_modules.iter().map(|c| c.to_string()).collect(),
                    location: cg.location(m),
                };
                (dto.id.clone(), dto)
            })
            .collect();
        let root_modules = cg.root_modules().map(|root| tree(cg, root)).collect();
        CallGraphDto {
            root_modules,
            module_map,
        }
    }
}

/// Build a nested tree without recursing on the call stack.
fn tree(cg: &CallGraph, root: &Module) -> ModuleTreeDto {
    fn shell(cg: &CallGraph, m: &Module) -> ModuleTreeDto {
        ModuleTreeDto {
            id: m.id.to_string(),
            kind: m.kind,
            name: m.name.clone(),
            children: Vec::with_capacity(m.children.len()),
            called_modules: m.called_modules.iter().map(|c| c.to_string()).collect(),
            location: cg.location(m),
        }
    }

    // Each entry is a node under construction and its children still to visit.
    let mut stack = vec![(shell(cg, root), root.children.iter())];
    let mut finished = None;
    while let Some((_, pending)) = stack.last_mut() {
        match pending.next() {
            Some(id) => {
                if let Some(child) = cg.module(*id) {
                    stack.push((shell(cg, child), child.children.iter()));
                }
            }
            None => {
                if let Some((done, _)) = stack.pop() {
                    match stack.last_mut() {
                        Some((parent, _)) => parent.children.push(done),
                        None => finished = Some(done),
                    }
                }
            }
        }
    }
    finished.unwrap_or_else(|| shell(cg, root))
}
