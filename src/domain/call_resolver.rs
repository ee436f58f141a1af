//! Pass 2: call edges with containment attribution.
//!
//! Each node's own invocation (call, construction, accessor read or write) is
//! resolved when the walk enters it. Edges then bubble up through non-module
//! nodes until the nearest enclosing module claims them, so an entity only
//! sees the call sites it directly owns.

use tree_sitter::Node;

use crate::domain::analysis::AnalysisRun;
use crate::domain::module::{ModuleId, ModuleKind};
use crate::domain::source::SourceFile;
use crate::domain::syntax;
use crate::ports::SymbolResolver;

struct Frame {
    module: Option<ModuleId>,
    calls: Vec<ModuleId>,
}

pub(crate) fn resolve_file(run: &mut AnalysisRun, file: &SourceFile, resolver: &dyn SymbolResolver) {
    let mut frames: Vec<Frame> = Vec::new();
    let mut cursor = file.root().walk();
    'walk: loop {
        let node = cursor.node();
        let mut calls = Vec::new();
        if let Some(edge) = edge_of(run, file, node, resolver) {
            calls.push(edge);
        }
        frames.push(Frame {
            module: run.module_for_node(&file.key(node)),
            calls,
        });
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            close(run, &mut frames);
            if cursor.goto_next_sibling() {
                continue 'walk;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
}

fn close(run: &mut AnalysisRun, frames: &mut Vec<Frame>) {
    let Some(frame) = frames.pop() else { return };
    match frame.module {
        Some(id) => run.record_calls(id, frame.calls),
        None => {
            if let Some(parent) = frames.last_mut() {
                parent.calls.extend(frame.calls);
            }
        }
    }
}

/// The edge a single node contributes by itself, if any.
fn edge_of(
    run: &AnalysisRun,
    file: &SourceFile,
    node: Node<'_>,
    resolver: &dyn SymbolResolver,
) -> Option<ModuleId> {
    match node.kind() {
        "call_expression" => {
            let callee = node.child_by_field_name("function")?;
            resolver
                .declarations_of(file, callee)
                .iter()
                .find_map(|key| run.module_for_declaration(key))
        }
        "new_expression" => {
            let constructor = node.child_by_field_name("constructor")?;
            // Only the first indexed declaration is considered, constructor or not.
            let class = resolver
                .declarations_of(file, constructor)
                .iter()
                .find_map(|key| run.module_for_declaration(key))?;
            run.constructor_of(class)
        }
        "member_expression" => {
            let property = node.child_by_field_name("property")?;
            let wanted = if syntax::is_assignment_target(node) {
                ModuleKind::Setter
            } else {
                ModuleKind::Getter
            };
            resolver
                .declarations_of(file, property)
                .iter()
                .filter_map(|key| run.module_for_declaration(key))
                .find(|id| run.kind_of(*id) == Some(wanted))
        }
        _ => None,
    }
}
