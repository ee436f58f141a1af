// Call-graph entities ("modules"): files, classes, functions, methods,
// constructors, accessors and static blocks.

use serde::{Deserialize, Serialize};

use crate::domain::node_key::FileId;

/// Run-scoped module identifier. Only meaningful within one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u32);

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `type` of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    File,
    Fn,
    Class,
    Constructor,
    Getter,
    Setter,
    Method,
    Static,
}

impl ModuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::File => "file",
            ModuleKind::Fn => "fn",
            ModuleKind::Class => "class",
            ModuleKind::Constructor => "constructor",
            ModuleKind::Getter => "getter",
            ModuleKind::Setter => "setter",
            ModuleKind::Method => "method",
            ModuleKind::Static => "static",
        }
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a module's defining syntax node sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
    /// 1-based
    pub line: usize,
}

/// A finished call-graph entity.
///
/// `children` and `called_modules` hold ids into the owning
/// [`CallGraph`](crate::domain::callgraph::CallGraph); the graph owns every
/// module and each non-root module appears in exactly one `children` list.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    pub kind: ModuleKind,
    pub name: Option<String>,
    pub children: Vec<ModuleId>,
    /// One entry per call site, in source order; duplicates are kept.
    pub called_modules: Vec<ModuleId>,
    pub span: SourceSpan,
}

impl Module {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}
