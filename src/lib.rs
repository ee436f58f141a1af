// Hierarchical call graphs for TypeScript and JavaScript projects.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

use std::path::Path;

pub use domain::callgraph::CallGraph;
pub use domain::module::{Module, ModuleId, ModuleKind};
pub use error::AnalyzeError;

use domain::analysis::AnalysisRun;
use infrastructure::{Project, ProjectLoader, TypeScriptResolver};

/// Build the call graph of `paths` under the `tsconfig.json` at `config_path`.
///
/// Fails only when the configuration or an input file cannot be read or
/// parsed. Symbols that do not resolve simply produce no edge.
pub fn analyze<P: AsRef<Path>>(paths: &[P], config_path: &Path) -> Result<CallGraph, AnalyzeError> {
    let project = ProjectLoader::load(paths, config_path)?;
    Ok(analyze_project(&project))
}

/// Build the call graph of an already loaded project.
pub fn analyze_project(project: &Project) -> CallGraph {
    let resolver = TypeScriptResolver::new(&project.files, project.config.clone());
    let graph = AnalysisRun::analyze(&project.files, &resolver);
    tracing::info!(
        files = project.files.len(),
        modules = graph.len(),
        edges = graph.edge_count(),
        "call graph built"
    );
    graph
}
