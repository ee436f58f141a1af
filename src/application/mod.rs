use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::callgraph::CallGraph;
use crate::ports::GraphExporter;

pub struct AnalyzeUsecase<'a> {
    pub exporter: &'a dyn GraphExporter,
}

impl<'a> AnalyzeUsecase<'a> {
    /// Analyze `sources` under `config` and write the graph to `out`.
    pub fn run<P: AsRef<Path>>(
        &self,
        sources: &[P],
        config: &Path,
        out: &mut dyn Write,
    ) -> Result<CallGraph> {
        let graph = crate::analyze(sources, config).context("Call graph analysis failed")?;
        self.exporter
            .export(&graph, out)
            .context("Failed to write call graph")?;
        Ok(graph)
    }
}
