//! Static symbol resolution for TypeScript and JavaScript.
//!
//! Identifiers resolve through lexical scopes and import/export aliases.
//! Property names resolve by inferring a shallow type for the receiver
//! (class instance, class constructor, object literal or namespace import)
//! and looking the member up on it, walking `extends` chains for classes.
//! Every lookup is depth-limited; anything not understood is unresolved.

use std::collections::HashSet;

use rayon::prelude::*;
use tree_sitter::Node;

use crate::domain::node_key::{FileId, NodeKey};
use crate::domain::source::SourceFile;
use crate::domain::syntax::{self, unquote};
use crate::infrastructure::binder::{Binding, BindingKind, ExportEntry, FileBindings, Imported};
use crate::infrastructure::module_resolution::ModuleResolver;
use crate::infrastructure::tsconfig::ProjectConfig;
use crate::ports::SymbolResolver;

const MAX_DEPTH: usize = 32;

/// `(file, exported name)` pairs already entered while following one alias chain.
type Visited = HashSet<(FileId, String)>;

/// What a name refers to once aliases are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    Declaration(NodeKey),
    Namespace(FileId),
}

/// Shallow receiver types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Type {
    /// An instance of the class at this node.
    Instance(NodeKey),
    /// The class itself (its static side).
    Static(NodeKey),
    /// An object literal.
    Object(NodeKey),
    Namespace(FileId),
}

pub struct TypeScriptResolver<'a> {
    files: &'a [SourceFile],
    bindings: Vec<FileBindings>,
    modules: ModuleResolver,
}

impl<'a> TypeScriptResolver<'a> {
    /// Bind every file. `files[i].id` must be `FileId(i)`.
    pub fn new(files: &'a [SourceFile], config: ProjectConfig) -> Self {
        let bindings = files.par_iter().map(FileBindings::bind).collect();
        let modules = ModuleResolver::new(files, config);
        Self {
            files,
            bindings,
            modules,
        }
    }

    fn file(&self, id: FileId) -> Option<&'a SourceFile> {
        self.files.get(id.index())
    }

    fn node(&self, key: NodeKey) -> Option<(&'a SourceFile, Node<'a>)> {
        let file = self.file(key.file)?;
        Some((file, file.node_at(key)?))
    }

    fn bindings_of(&self, id: FileId) -> Option<&FileBindings> {
        self.bindings.get(id.index())
    }

    // ==== Names ====

    fn resolve_identifier(&self, file: &SourceFile, node: Node<'_>, depth: usize) -> Vec<Symbol> {
        let Some(bindings) = self.bindings_of(file.id) else {
            return Vec::new();
        };
        let name = file.text_of(node);
        let mut current = node.parent();
        while let Some(scope) = current {
            if let Some(found) = bindings.lookup(&file.key(scope), name) {
                return self.resolve_bindings(file, found, depth, &mut Visited::new());
            }
            current = scope.parent();
        }
        tracing::trace!(name, path = %file.path.display(), "unbound identifier");
        Vec::new()
    }

    fn resolve_bindings(
        &self,
        file: &SourceFile,
        bindings: &[Binding],
        depth: usize,
        visited: &mut Visited,
    ) -> Vec<Symbol> {
        let mut out = Vec::new();
        for binding in bindings {
            match &binding.kind {
                BindingKind::Local => out.push(Symbol::Declaration(binding.declaration)),
                BindingKind::Import {
                    specifier,
                    imported,
                } => {
                    let Some(target) = self.modules.resolve(&file.path, specifier) else {
                        tracing::trace!(specifier, "import target is not part of the analysis");
                        continue;
                    };
                    match imported {
                        Imported::Namespace => out.push(Symbol::Namespace(target)),
                        Imported::Default => {
                            out.extend(self.follow_export(target, "default", depth + 1, visited))
                        }
                        Imported::Named(name) => {
                            out.extend(self.follow_export(target, name, depth + 1, visited))
                        }
                    }
                }
            }
        }
        out
    }

    /// Follow `name` through `file`'s export table to its declarations.
    fn resolve_export(&self, id: FileId, name: &str, depth: usize) -> Vec<Symbol> {
        self.follow_export(id, name, depth, &mut Visited::new())
    }

    /// Each `(file, name)` is entered at most once per chain, so cyclic
    /// `export *` graphs stay linear in the number of files.
    fn follow_export(&self, id: FileId, name: &str, depth: usize, visited: &mut Visited) -> Vec<Symbol> {
        if depth > MAX_DEPTH || !visited.insert((id, name.to_string())) {
            return Vec::new();
        }
        let (Some(file), Some(bindings)) = (self.file(id), self.bindings_of(id)) else {
            return Vec::new();
        };
        if let Some(entries) = bindings.exports().get(name) {
            let mut out = Vec::new();
            for entry in entries {
                match entry {
                    ExportEntry::Local(local) => {
                        if let Some(found) = bindings.lookup_top_level(local) {
                            out.extend(self.resolve_bindings(file, found, depth + 1, visited));
                        }
                    }
                    ExportEntry::Declaration(key) => out.push(Symbol::Declaration(*key)),
                    ExportEntry::Reexport { specifier, name } => {
                        if let Some(target) = self.modules.resolve(&file.path, specifier) {
                            out.extend(self.follow_export(target, name, depth + 1, visited));
                        }
                    }
                    ExportEntry::Namespace { specifier } => {
                        if let Some(target) = self.modules.resolve(&file.path, specifier) {
                            out.push(Symbol::Namespace(target));
                        }
                    }
                }
            }
            return out;
        }
        if name == "default" {
            return Vec::new();
        }
        for specifier in bindings.exports().star() {
            let Some(target) = self.modules.resolve(&file.path, specifier) else {
                continue;
            };
            let found = self.follow_export(target, name, depth + 1, visited);
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    // ==== Members ====

    fn resolve_member(&self, file: &SourceFile, member: Node<'_>, depth: usize) -> Vec<Symbol> {
        let (Some(object), Some(property)) = (
            member.child_by_field_name("object"),
            member.child_by_field_name("property"),
        ) else {
            return Vec::new();
        };
        let Some(receiver) = self.type_of(file, object, depth + 1) else {
            return Vec::new();
        };
        self.lookup_member(receiver, file.text_of(property), depth + 1)
    }

    fn lookup_member(&self, receiver: Type, name: &str, depth: usize) -> Vec<Symbol> {
        if depth > MAX_DEPTH {
            return Vec::new();
        }
        match receiver {
            Type::Namespace(id) => self.resolve_export(id, name, depth + 1),
            Type::Object(key) => self.object_members(key, name, depth),
            Type::Instance(class) => self.class_members(class, name, false, depth),
            Type::Static(class) => self.class_members(class, name, true, depth),
        }
    }

    fn object_members(&self, key: NodeKey, name: &str, depth: usize) -> Vec<Symbol> {
        let Some((file, object)) = self.node(key) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cursor = object.walk();
        for entry in object.named_children(&mut cursor) {
            match entry.kind() {
                "pair" | "method_definition" => {
                    if member_name(file, entry).as_deref() == Some(name) {
                        out.push(Symbol::Declaration(file.key(entry)));
                    }
                }
                "shorthand_property_identifier" if file.text_of(entry) == name => {
                    out.extend(self.resolve_identifier(file, entry, depth + 1));
                }
                _ => {}
            }
        }
        out
    }

    fn class_members(&self, class: NodeKey, name: &str, is_static: bool, depth: usize) -> Vec<Symbol> {
        let Some((file, class_node)) = self.node(class) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        if let Some(body) = class_node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                match member.kind() {
                    _ if syntax::is_constructor(file, member) => {
                        if !is_static {
                            out.extend(parameter_properties(file, member, name));
                        }
                    }
                    "method_definition"
                    | "method_signature"
                    | "abstract_method_signature"
                    | "public_field_definition"
                    | "field_definition" => {
                        if syntax::is_static_member(member) == is_static
                            && member_name(file, member).as_deref() == Some(name)
                        {
                            out.push(Symbol::Declaration(file.key(member)));
                        }
                    }
                    _ => {}
                }
            }
        }
        if !out.is_empty() {
            return out;
        }
        match self.superclass(file, class_node, depth + 1) {
            Some(base) => self.class_members(base, name, is_static, depth + 1),
            None => out,
        }
    }

    fn superclass(&self, file: &SourceFile, class_node: Node<'_>, depth: usize) -> Option<NodeKey> {
        if depth > MAX_DEPTH {
            return None;
        }
        let mut cursor = class_node.walk();
        let heritage = class_node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "class_heritage")?;
        let mut cursor = heritage.walk();
        let clause = heritage
            .named_children(&mut cursor)
            .find(|c| c.kind() == "extends_clause");
        // TypeScript wraps the base in `extends_clause`; JavaScript does not.
        let base = match clause {
            Some(clause) => clause.child_by_field_name("value")?,
            None => syntax::first_named_child(heritage)?,
        };
        match self.type_of(file, base, depth + 1)? {
            Type::Static(class) => Some(class),
            _ => None,
        }
    }

    // ==== Types ====

    fn type_of(&self, file: &SourceFile, expression: Node<'_>, depth: usize) -> Option<Type> {
        if depth > MAX_DEPTH {
            return None;
        }
        match expression.kind() {
            "parenthesized_expression" | "non_null_expression" | "await_expression" => {
                self.type_of(file, syntax::first_named_child(expression)?, depth + 1)
            }
            "as_expression" | "satisfies_expression" => {
                let mut cursor = expression.walk();
                let parts: Vec<Node<'_>> = expression.named_children(&mut cursor).collect();
                let annotated = parts
                    .last()
                    .and_then(|t| self.type_from_annotation(file, *t, depth + 1));
                annotated.or_else(|| self.type_of(file, *parts.first()?, depth + 1))
            }
            "new_expression" => {
                let constructor = expression.child_by_field_name("constructor")?;
                match self.type_of(file, constructor, depth + 1)? {
                    Type::Static(class) => Some(Type::Instance(class)),
                    _ => None,
                }
            }
            "this" => self.this_type(file, expression),
            "super" => match self.this_type(file, expression)? {
                Type::Instance(class) => {
                    let (class_file, node) = self.node(class)?;
                    self.superclass(class_file, node, depth + 1).map(Type::Instance)
                }
                Type::Static(class) => {
                    let (class_file, node) = self.node(class)?;
                    self.superclass(class_file, node, depth + 1).map(Type::Static)
                }
                _ => None,
            },
            "identifier" => {
                let symbol = *self.resolve_identifier(file, expression, depth + 1).first()?;
                self.type_of_symbol(symbol, depth + 1)
            }
            "member_expression" => {
                let symbol = *self.resolve_member(file, expression, depth + 1).first()?;
                self.type_of_symbol(symbol, depth + 1)
            }
            "call_expression" => {
                let callee = expression.child_by_field_name("function")?;
                let symbols = match callee.kind() {
                    "identifier" => self.resolve_identifier(file, callee, depth + 1),
                    "member_expression" => self.resolve_member(file, callee, depth + 1),
                    _ => return None,
                };
                let Symbol::Declaration(key) = *symbols.first()? else {
                    return None;
                };
                let (decl_file, declaration) = self.node(key)?;
                let function = callable_of(declaration)?;
                let annotation = function.child_by_field_name("return_type")?;
                self.type_from_annotation(decl_file, annotation, depth + 1)
            }
            "object" => Some(Type::Object(file.key(expression))),
            "class" => Some(Type::Static(file.key(expression))),
            _ => None,
        }
    }

    fn type_of_symbol(&self, symbol: Symbol, depth: usize) -> Option<Type> {
        match symbol {
            Symbol::Namespace(id) => Some(Type::Namespace(id)),
            Symbol::Declaration(key) => self.type_of_declaration(key, depth),
        }
    }

    fn type_of_declaration(&self, key: NodeKey, depth: usize) -> Option<Type> {
        if depth > MAX_DEPTH {
            return None;
        }
        let (file, node) = self.node(key)?;
        match node.kind() {
            "class_declaration" | "abstract_class_declaration" | "class" => Some(Type::Static(key)),
            "object" => Some(Type::Object(key)),
            "variable_declarator"
            | "public_field_definition"
            | "field_definition"
            | "required_parameter"
            | "optional_parameter" => {
                if let Some(annotation) = node.child_by_field_name("type") {
                    if let Some(found) = self.type_from_annotation(file, annotation, depth + 1) {
                        return Some(found);
                    }
                }
                self.type_of(file, node.child_by_field_name("value")?, depth + 1)
            }
            "pair" => self.type_of(file, node.child_by_field_name("value")?, depth + 1),
            "method_definition" | "abstract_method_signature" if syntax::has_token(node, "get") => {
                let annotation = node.child_by_field_name("return_type")?;
                self.type_from_annotation(file, annotation, depth + 1)
            }
            _ => None,
        }
    }

    /// Instance type named by a type annotation, when it names a class.
    fn type_from_annotation(&self, file: &SourceFile, annotation: Node<'_>, depth: usize) -> Option<Type> {
        if depth > MAX_DEPTH {
            return None;
        }
        match annotation.kind() {
            "type_annotation" | "parenthesized_type" => {
                self.type_from_annotation(file, syntax::first_named_child(annotation)?, depth + 1)
            }
            "generic_type" => {
                self.type_from_annotation(file, annotation.child_by_field_name("name")?, depth + 1)
            }
            "type_identifier" => {
                let symbol = *self.resolve_identifier(file, annotation, depth + 1).first()?;
                instance_of(self.type_of_symbol(symbol, depth + 1)?)
            }
            "nested_type_identifier" => {
                let namespace = annotation.child_by_field_name("module")?;
                let name = annotation.child_by_field_name("name")?;
                let Type::Namespace(id) = self.type_of(file, namespace, depth + 1)? else {
                    return None;
                };
                let symbol = *self.resolve_export(id, file.text_of(name), depth + 1).first()?;
                instance_of(self.type_of_symbol(symbol, depth + 1)?)
            }
            _ => None,
        }
    }

    /// The type `this` has at `node`. Arrow functions do not rebind it.
    fn this_type(&self, file: &SourceFile, node: Node<'_>) -> Option<Type> {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            match ancestor.kind() {
                "method_definition" | "public_field_definition" | "field_definition" | "class_static_block" => {
                    let container = ancestor.parent()?;
                    return match container.kind() {
                        "class_body" => {
                            let class = file.key(container.parent()?);
                            if syntax::is_static_member(ancestor) {
                                Some(Type::Static(class))
                            } else {
                                Some(Type::Instance(class))
                            }
                        }
                        "object" => Some(Type::Object(file.key(container))),
                        _ => None,
                    };
                }
                "function_expression" | "generator_function" => {
                    // `{ m: function () { this } }` binds `this` to the literal.
                    let pair = ancestor.parent().filter(|p| p.kind() == "pair");
                    return pair
                        .and_then(|p| p.parent())
                        .filter(|o| o.kind() == "object")
                        .map(|o| Type::Object(file.key(o)));
                }
                "function_declaration" | "generator_function_declaration" | "program" => return None,
                _ => current = ancestor.parent(),
            }
        }
        None
    }
}

impl SymbolResolver for TypeScriptResolver<'_> {
    fn declarations_of(&self, file: &SourceFile, node: Node<'_>) -> Vec<NodeKey> {
        let symbols = match node.kind() {
            "identifier" => self.resolve_identifier(file, node, 0),
            "member_expression" => self.resolve_member(file, node, 0),
            "property_identifier" | "private_property_identifier" => match node.parent() {
                Some(parent) if parent.kind() == "member_expression" => {
                    self.resolve_member(file, parent, 0)
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        symbols
            .into_iter()
            .filter_map(|symbol| match symbol {
                Symbol::Declaration(key) => Some(key),
                Symbol::Namespace(_) => None,
            })
            .collect()
    }
}

fn instance_of(found: Type) -> Option<Type> {
    match found {
        Type::Static(class) => Some(Type::Instance(class)),
        _ => None,
    }
}

/// Name of a class or object member as written, quotes removed.
fn member_name(file: &SourceFile, member: Node<'_>) -> Option<String> {
    let name = syntax::declaration_name_node(member)?;
    Some(unquote(file.text_of(name)).to_string())
}

/// TypeScript constructor parameter properties (`constructor(private x: X)`).
fn parameter_properties(file: &SourceFile, constructor: Node<'_>, name: &str) -> Vec<Symbol> {
    let Some(params) = constructor.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    let found = params
        .named_children(&mut cursor)
        .filter(|p| {
            let mut cursor = p.walk();
            let is_property = p
                .children(&mut cursor)
                .any(|c| c.kind() == "accessibility_modifier" || c.kind() == "readonly");
            is_property
        })
        .filter(|p| {
            p.child_by_field_name("pattern")
                .map(|pattern| file.text_of(pattern) == name)
                .unwrap_or(false)
        })
        .map(|p| Symbol::Declaration(file.key(p)))
        .collect();
    found
}

/// The function node behind a declaration that can be called.
fn callable_of(declaration: Node<'_>) -> Option<Node<'_>> {
    match declaration.kind() {
        "function_declaration"
        | "generator_function_declaration"
        | "function_signature"
        | "method_definition"
        | "method_signature"
        | "abstract_method_signature" => Some(declaration),
        "variable_declarator" | "pair" | "public_field_definition" | "field_definition" => {
            let value = declaration.child_by_field_name("value")?;
            matches!(
                value.kind(),
                "arrow_function" | "function_expression" | "generator_function"
            )
            .then_some(value)
        }
        "arrow_function" | "function_expression" | "generator_function" => Some(declaration),
        _ => None,
    }
}
