// Output formats for a finished call graph.

use std::io::Write;

use crate::api::dto::CallGraphDto;
use crate::domain::callgraph::CallGraph;
use crate::domain::module::{Module, ModuleId};
use crate::ports::GraphExporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Dot,
    Text,
}

impl OutputFormat {
    pub fn exporter(self) -> Box<dyn GraphExporter> {
        match self {
            OutputFormat::Json => Box::new(JsonExporter),
            OutputFormat::Dot => Box::new(DotExporter),
            OutputFormat::Text => Box::new(TextExporter),
        }
    }
}

/// Pretty-printed JSON of [`CallGraphDto`].
pub struct JsonExporter;

impl GraphExporter for JsonExporter {
    fn export(&self, graph: &CallGraph, out: &mut dyn Write) -> std::io::Result<()> {
        let dto = CallGraphDto::from(graph);
        serde_json::to_writer_pretty(&mut *out, &dto)?;
        writeln!(out)
    }
}

/// Graphviz DOT. Modules with children become clusters holding an invisible
/// anchor node that edges attach to; leaf modules are plain nodes.
pub struct DotExporter;

enum Step {
    Enter(ModuleId, usize),
    Exit(ModuleId, usize),
}

impl DotExporter {
    pub fn to_dot(graph: &CallGraph) -> String {
        let mut lines = Vec::new();
        lines.push("digraph G {".to_string());
        lines.push("    rankdir=LR;".to_string());
        lines.push("    node [style=filled, color=white];".to_string());

        let mut edges = Vec::new();
        let mut stack: Vec<Step> = graph
            .root_ids()
            .iter()
            .rev()
            .map(|id| Step::Enter(*id, 1))
            .collect();
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id, depth) => {
                    let Some(module) = graph.module(id) else { continue };
                    let indent = "    ".repeat(depth);
                    let from = Self::node_id(module);
                    for callee in graph.called(module) {
                        edges.push(format!("    \"{}\" -> \"{}\";", from, Self::node_id(callee)));
                    }
                    if module.children.is_empty() {
                        lines.push(format!(
                            "{}\"{}\" [label=\"{}\", shape=circle, fillcolor=lightblue, fontname=\"Arial\", fontsize=12];",
                            indent,
                            from,
                            Self::escape_label(module.name.as_deref().unwrap_or(""))
                        ));
                        continue;
                    }
                    lines.push(format!("{}subgraph cluster_{} {{", indent, module.id));
                    lines.push(format!(
                        "{}    label=\"{}\";",
                        indent,
                        Self::escape_label(module.name.as_deref().unwrap_or(""))
                    ));
                    lines.push(format!("{}    color=blue;", indent));
                    stack.push(Step::Exit(id, depth));
                    stack.extend(module.children.iter().rev().map(|c| Step::Enter(*c, depth + 1)));
                }
                Step::Exit(id, depth) => {
                    let indent = "    ".repeat(depth);
                    lines.push(format!("{}    \"{}_invisible\" [style=invis, label=\"\"];", indent, id));
                    lines.push(format!("{}}}", indent));
                }
            }
        }

        lines.extend(edges);
        lines.push("}".to_string());
        lines.join("\n")
    }

    fn node_id(module: &Module) -> String {
        if module.children.is_empty() {
            module.id.to_string()
        } else {
            format!("{}_invisible", module.id)
        }
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}

impl GraphExporter for DotExporter {
    fn export(&self, graph: &CallGraph, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "{}", Self::to_dot(graph))
    }
}

/// Indented containment tree with `->` lines for call edges.
pub struct TextExporter;

impl GraphExporter for TextExporter {
    fn export(&self, graph: &CallGraph, out: &mut dyn Write) -> std::io::Result<()> {
        let mut stack: Vec<(ModuleId, usize)> =
            graph.root_ids().iter().rev().map(|id| (*id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(module) = graph.module(id) else { continue };
            let indent = "  ".repeat(depth);
            writeln!(
                out,
                "{}{} {} ({})",
                indent,
                module.kind,
                module.label(),
                graph.location(module)
            )?;
            for callee in graph.called(module) {
                writeln!(
                    out,
                    "{}  -> {} {} ({})",
                    indent,
                    callee.kind,
                    callee.label(),
                    graph.location(callee)
                )?;
            }
            stack.extend(module.children.iter().rev().map(|c| (*c, depth + 1)));
        }
        Ok(())
    }
}
