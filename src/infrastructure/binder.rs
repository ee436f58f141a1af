//! Per-file name binding.
//!
//! One pass over a file records, for every lexical scope, which names it
//! declares and what they refer to, plus the file's export table. Scopes are
//! keyed by the node that opens them; lookups walk the syntax ancestry of the
//! referencing node and take the first scope that declares the name.

use std::collections::HashMap;

use tree_sitter::Node;

use crate::domain::node_key::NodeKey;
use crate::domain::source::SourceFile;
use crate::domain::syntax::{self, unquote};

/// Nodes that receive `var` and function declarations.
const FUNCTION_SCOPES: &[&str] = &[
    "program",
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "generator_function",
    "arrow_function",
    "method_definition",
    "class_static_block",
];

/// Nodes that receive `let`, `const`, class and enum declarations.
const BLOCK_SCOPES: &[&str] = &[
    "program",
    "statement_block",
    "for_statement",
    "for_in_statement",
    "catch_clause",
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "generator_function",
    "arrow_function",
    "method_definition",
    "class_static_block",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Default,
    Namespace,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// Declared in this file; `declaration` is the declaring node.
    Local,
    /// Brought in by an import; resolved through the target's exports.
    Import { specifier: String, imported: Imported },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub declaration: NodeKey,
    pub kind: BindingKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEntry {
    /// `export { a }` or `export default a`: a name in the file's top scope.
    Local(String),
    /// `export function f() {}`, `export default class A {}`.
    Declaration(NodeKey),
    /// `export { a as b } from "./x"`.
    Reexport { specifier: String, name: String },
    /// `export * as ns from "./x"`.
    Namespace { specifier: String },
}

#[derive(Debug, Default)]
pub struct Exports {
    named: HashMap<String, Vec<ExportEntry>>,
    /// `export * from "./x"` specifiers, in source order.
    star: Vec<String>,
}

impl Exports {
    pub fn get(&self, name: &str) -> Option<&[ExportEntry]> {
        self.named.get(name).map(Vec::as_slice)
    }

    pub fn star(&self) -> &[String] {
        &self.star
    }

    fn add(&mut self, name: String, entry: ExportEntry) {
        self.named.entry(name).or_default().push(entry);
    }
}

#[derive(Debug, Default)]
pub struct FileBindings {
    program: Option<NodeKey>,
    scopes: HashMap<NodeKey, HashMap<String, Vec<Binding>>>,
    exports: Exports,
}

impl FileBindings {
    pub fn bind(file: &SourceFile) -> Self {
        let mut binder = Binder {
            file,
            out: FileBindings {
                program: Some(file.key(file.root())),
                ..FileBindings::default()
            },
        };
        let mut stack = vec![file.root()];
        while let Some(node) = stack.pop() {
            binder.visit(node);
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        binder.out
    }

    /// Bindings for `name` declared directly in the scope opened by `scope`.
    pub fn lookup(&self, scope: &NodeKey, name: &str) -> Option<&[Binding]> {
        self.scopes
            .get(scope)
            .and_then(|names| names.get(name))
            .map(Vec::as_slice)
    }

    /// Bindings for `name` in the file's top-level scope.
    pub fn lookup_top_level(&self, name: &str) -> Option<&[Binding]> {
        self.program.as_ref().and_then(|p| self.lookup(p, name))
    }

    pub fn exports(&self) -> &Exports {
        &self.exports
    }
}

struct Binder<'f> {
    file: &'f SourceFile,
    out: FileBindings,
}

impl<'f> Binder<'f> {
    fn visit(&mut self, node: Node<'f>) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                self.bind_name(node, node, FUNCTION_SCOPES);
            }
            "class_declaration" | "abstract_class_declaration" | "enum_declaration" => {
                self.bind_name(node, node, BLOCK_SCOPES);
            }
            "function_expression" | "generator_function" | "class" => {
                // A named expression sees its own name from inside.
                if let Some(name) = node.child_by_field_name("name") {
                    let declaration = syntax::declaration_from_context(node).unwrap_or(node);
                    let name = self.file.text_of(name).to_string();
                    self.insert(node, name, self.local(declaration));
                }
            }
            "variable_declarator" => self.bind_declarator(node),
            "formal_parameters" => {
                if let Some(owner) = node.parent() {
                    let mut cursor = node.walk();
                    let params: Vec<Node<'f>> = node.named_children(&mut cursor).collect();
                    for param in params {
                        self.bind_parameter(owner, param);
                    }
                }
            }
            "arrow_function" => {
                if let Some(param) = node.child_by_field_name("parameter") {
                    self.bind_parameter(node, param);
                }
            }
            "catch_clause" => {
                if let Some(param) = node.child_by_field_name("parameter") {
                    self.bind_pattern(node, param);
                }
            }
            "for_in_statement" if node.child_by_field_name("kind").is_some() => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.bind_pattern(node, left);
                }
            }
            "import_statement" => self.bind_import(node),
            "export_statement" => self.record_export(node),
            _ => {}
        }
    }

    fn local(&self, declaration: Node<'_>) -> Binding {
        Binding {
            declaration: self.file.key(declaration),
            kind: BindingKind::Local,
        }
    }

    fn insert(&mut self, scope: Node<'_>, name: String, binding: Binding) {
        self.out
            .scopes
            .entry(self.file.key(scope))
            .or_default()
            .entry(name)
            .or_default()
            .push(binding);
    }

    /// Bind `declaration`'s `name` field in the nearest enclosing scope of `kinds`.
    fn bind_name(&mut self, node: Node<'f>, declaration: Node<'f>, kinds: &[&str]) {
        let Some(name) = node.child_by_field_name("name") else { return };
        let Some(scope) = enclosing(node, kinds) else { return };
        let name = self.file.text_of(name).to_string();
        self.insert(scope, name, self.local(declaration));
    }

    fn bind_declarator(&mut self, declarator: Node<'f>) {
        let Some(name) = declarator.child_by_field_name("name") else { return };
        let hoisted = declarator
            .parent()
            .map(|p| p.kind() == "variable_declaration")
            .unwrap_or(false);
        let kinds = if hoisted { FUNCTION_SCOPES } else { BLOCK_SCOPES };
        let Some(scope) = enclosing(declarator, kinds) else { return };
        if name.kind() == "identifier" {
            let text = self.file.text_of(name).to_string();
            self.insert(scope, text, self.local(declarator));
        } else {
            self.bind_pattern(scope, name);
        }
    }

    fn bind_parameter(&mut self, owner: Node<'f>, param: Node<'f>) {
        match param.kind() {
            "required_parameter" | "optional_parameter" => {
                let Some(pattern) = param.child_by_field_name("pattern") else { return };
                if pattern.kind() == "identifier" {
                    // Keyed by the parameter so its type annotation stays reachable.
                    let text = self.file.text_of(pattern).to_string();
                    self.insert(owner, text, self.local(param));
                } else {
                    self.bind_pattern(owner, pattern);
                }
            }
            _ => self.bind_pattern(owner, param),
        }
    }

    /// Bind every identifier a destructuring pattern introduces to itself.
    fn bind_pattern(&mut self, scope: Node<'f>, pattern: Node<'f>) {
        let mut stack = vec![pattern];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "identifier" | "shorthand_property_identifier_pattern" => {
                    let text = self.file.text_of(node).to_string();
                    self.insert(scope, text, self.local(node));
                }
                "pair_pattern" => stack.extend(node.child_by_field_name("value")),
                "assignment_pattern" | "object_assignment_pattern" => {
                    stack.extend(node.child_by_field_name("left"))
                }
                "object_pattern" | "array_pattern" | "rest_pattern" => {
                    let mut cursor = node.walk();
                    let children: Vec<Node<'f>> = node.named_children(&mut cursor).collect();
                    stack.extend(children.into_iter().rev());
                }
                _ => {}
            }
        }
    }

    fn bind_import(&mut self, statement: Node<'f>) {
        let Some(source) = statement.child_by_field_name("source") else { return };
        let specifier = unquote(self.file.text_of(source)).to_string();
        let Some(program) = enclosing(statement, &["program"]) else { return };

        let mut cursor = statement.walk();
        let clauses: Vec<Node<'f>> = statement
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "import_clause")
            .collect();
        for clause in clauses {
            let mut cursor = clause.walk();
            let parts: Vec<Node<'f>> = clause.named_children(&mut cursor).collect();
            for part in parts {
                match part.kind() {
                    "identifier" => {
                        self.bind_import_name(program, part, part, &specifier, Imported::Default)
                    }
                    "namespace_import" => {
                        if let Some(local) = syntax::first_named_child(part) {
                            self.bind_import_name(program, part, local, &specifier, Imported::Namespace);
                        }
                    }
                    "named_imports" => {
                        let mut cursor = part.walk();
                        let specs: Vec<Node<'f>> = part
                            .named_children(&mut cursor)
                            .filter(|s| s.kind() == "import_specifier")
                            .collect();
                        for spec in specs {
                            let Some(name) = spec.child_by_field_name("name") else { continue };
                            let local = spec.child_by_field_name("alias").unwrap_or(name);
                            let imported = unquote(self.file.text_of(name)).to_string();
                            let imported = if imported == "default" {
                                Imported::Default
                            } else {
                                Imported::Named(imported)
                            };
                            self.bind_import_name(program, spec, local, &specifier, imported);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn bind_import_name(
        &mut self,
        program: Node<'f>,
        declaration: Node<'f>,
        local: Node<'f>,
        specifier: &str,
        imported: Imported,
    ) {
        let binding = Binding {
            declaration: self.file.key(declaration),
            kind: BindingKind::Import {
                specifier: specifier.to_string(),
                imported,
            },
        };
        let name = self.file.text_of(local).to_string();
        self.insert(program, name, binding);
    }

    fn record_export(&mut self, statement: Node<'f>) {
        let source = statement
            .child_by_field_name("source")
            .map(|s| unquote(self.file.text_of(s)).to_string());
        let is_default = syntax::has_token(statement, "default");

        if let Some(declaration) = statement.child_by_field_name("declaration") {
            if is_default {
                let entry = ExportEntry::Declaration(self.file.key(declaration));
                self.out.exports.add("default".to_string(), entry);
                return;
            }
            for (name, node) in self.declared_names(declaration) {
                let entry = ExportEntry::Declaration(self.file.key(node));
                self.out.exports.add(name, entry);
            }
            return;
        }

        if let Some(value) = statement.child_by_field_name("value") {
            let mut value = value;
            while value.kind() == "parenthesized_expression" {
                match syntax::first_named_child(value) {
                    Some(inner) => value = inner,
                    None => break,
                }
            }
            // Anonymous default values have no declaration to resolve to.
            if value.kind() == "identifier" {
                let entry = ExportEntry::Local(self.file.text_of(value).to_string());
                self.out.exports.add("default".to_string(), entry);
            }
            return;
        }

        let mut cursor = statement.walk();
        let parts: Vec<Node<'f>> = statement.named_children(&mut cursor).collect();
        let mut saw_clause = false;
        for part in parts {
            match part.kind() {
                "export_clause" => {
                    saw_clause = true;
                    self.record_export_clause(part, source.as_deref());
                }
                "namespace_export" => {
                    saw_clause = true;
                    let (Some(source), Some(name)) = (&source, syntax::first_named_child(part)) else {
                        continue;
                    };
                    let name = unquote(self.file.text_of(name)).to_string();
                    let entry = ExportEntry::Namespace {
                        specifier: source.clone(),
                    };
                    self.out.exports.add(name, entry);
                }
                _ => {}
            }
        }
        if !saw_clause {
            if let Some(source) = source {
                self.out.exports.star.push(source);
            }
        }
    }

    fn record_export_clause(&mut self, clause: Node<'f>, source: Option<&str>) {
        let mut cursor = clause.walk();
        let specs: Vec<Node<'f>> = clause
            .named_children(&mut cursor)
            .filter(|s| s.kind() == "export_specifier")
            .collect();
        for spec in specs {
            let Some(name) = spec.child_by_field_name("name") else { continue };
            let local = unquote(self.file.text_of(name)).to_string();
            let exported = spec
                .child_by_field_name("alias")
                .map(|a| unquote(self.file.text_of(a)).to_string())
                .unwrap_or_else(|| local.clone());
            let entry = match source {
                Some(specifier) => ExportEntry::Reexport {
                    specifier: specifier.to_string(),
                    name: local,
                },
                None => ExportEntry::Local(local),
            };
            self.out.exports.add(exported, entry);
        }
    }

    /// Names a declaration statement introduces, with the node each is keyed by.
    fn declared_names(&self, declaration: Node<'f>) -> Vec<(String, Node<'f>)> {
        match declaration.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = declaration.walk();
                let declarators: Vec<Node<'f>> = declaration
                    .named_children(&mut cursor)
                    .filter(|d| d.kind() == "variable_declarator")
                    .collect();
                declarators
                    .into_iter()
                    .filter_map(|d| {
                        let name = d.child_by_field_name("name")?;
                        (name.kind() == "identifier")
                            .then(|| (self.file.text_of(name).to_string(), d))
                    })
                    .collect()
            }
            _ => declaration
                .child_by_field_name("name")
                .map(|name| vec![(self.file.text_of(name).to_string(), declaration)])
                .unwrap_or_default(),
        }
    }
}

/// Nearest strict ancestor of `node` whose kind is in `kinds`.
pub fn enclosing<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if kinds.contains(&candidate.kind()) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}
