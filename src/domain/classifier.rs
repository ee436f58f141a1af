//! Pass 1: entity classification and containment.
//!
//! Walks a file's tree once, creating a module for every entity-defining node.
//! A module's children are the entity-defining nodes found below it, with
//! non-entity nodes forwarding what they find to the nearest entity above.

use tree_sitter::Node;

use crate::domain::analysis::AnalysisRun;
use crate::domain::module::{ModuleId, ModuleKind};
use crate::domain::source::SourceFile;
use crate::domain::syntax;

struct Frame {
    module: Option<ModuleId>,
    children: Vec<ModuleId>,
}

impl Frame {
    fn new(module: Option<ModuleId>) -> Self {
        Self {
            module,
            children: Vec::new(),
        }
    }
}

/// Classify one file and return its root (`file`) module.
pub(crate) fn classify_file(run: &mut AnalysisRun, file: &SourceFile) -> ModuleId {
    let root = file.root();
    let root_id = run.create_module(
        ModuleKind::File,
        Some(file.path.display().to_string()),
        file.key(root),
        None,
        1,
    );

    // Iterative pre/post-order walk; `frames` mirrors the cursor's ancestry.
    let mut frames = vec![Frame::new(Some(root_id))];
    let mut cursor = root.walk();
    if cursor.goto_first_child() {
        'walk: loop {
            let node = cursor.node();
            let module = enter(run, file, node);
            frames.push(Frame::new(module));
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                close(run, &mut frames);
                if cursor.goto_next_sibling() {
                    continue 'walk;
                }
                cursor.goto_parent();
                if frames.len() == 1 {
                    break 'walk;
                }
            }
        }
    }

    if let Some(frame) = frames.pop() {
        run.set_children(root_id, frame.children);
    }
    root_id
}

fn enter(run: &mut AnalysisRun, file: &SourceFile, node: Node<'_>) -> Option<ModuleId> {
    let classification = syntax::classify(file, node)?;
    let name = classification
        .declaration
        .and_then(syntax::declaration_name_node)
        .map(|n| file.text_of(n).to_string());
    let id = run.create_module(
        classification.kind,
        name,
        file.key(node),
        classification.declaration.map(|d| file.key(d)),
        file.line_of(node),
    );

    if classification.kind == ModuleKind::Constructor {
        link_constructor(run, file, node, id);
    }
    Some(id)
}

/// Record class → constructor when the constructor's class is already a module.
fn link_constructor(run: &mut AnalysisRun, file: &SourceFile, constructor: Node<'_>, id: ModuleId) {
    let class = constructor
        .parent()
        .filter(|body| body.kind() == "class_body")
        .and_then(|body| body.parent());
    let Some(class) = class else { return };
    if let Some(class_id) = run.module_for_node(&file.key(class)) {
        if run.kind_of(class_id) == Some(ModuleKind::Class) {
            run.link_constructor(class_id, id);
        }
    }
}

fn close(run: &mut AnalysisRun, frames: &mut Vec<Frame>) {
    let Some(frame) = frames.pop() else { return };
    let Some(parent) = frames.last_mut() else { return };
    match frame.module {
        Some(id) => {
            run.set_children(id, frame.children);
            parent.children.push(id);
        }
        None => parent.children.extend(frame.children),
    }
}
