//! Syntax helpers over tree-sitter TypeScript/JavaScript trees.
//!
//! Holds the entity classification table, naming-context inference and the
//! assignment-target test. Kind names are shared by the TypeScript, TSX and
//! JavaScript grammars unless noted.

use tree_sitter::Node;

use crate::domain::module::ModuleKind;
use crate::domain::source::SourceFile;

/// How a syntax node participates in the call graph.
#[derive(Debug, Clone, Copy)]
pub struct Classification<'tree> {
    pub kind: ModuleKind,
    /// The construct that names the entity and keys it in the declaration index.
    pub declaration: Option<Node<'tree>>,
}

/// Classify a node as entity-defining, or `None` if it is not.
pub fn classify<'tree>(file: &'tree SourceFile, node: Node<'tree>) -> Option<Classification<'tree>> {
    if !node.is_named() {
        return None;
    }
    let (kind, declaration) = match node.kind() {
        "program" => (ModuleKind::File, None),
        "method_definition" | "abstract_method_signature" => (method_kind(file, node), Some(node)),
        // Overload signatures inside a class; interface members are types only.
        "method_signature" if is_class_member(node) => (method_kind(file, node), Some(node)),
        "class_static_block" => (ModuleKind::Static, None),
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            (ModuleKind::Fn, Some(node))
        }
        "function_expression" | "generator_function" | "arrow_function" => {
            (ModuleKind::Fn, declaration_from_context(node))
        }
        "class_declaration" | "abstract_class_declaration" => (ModuleKind::Class, Some(node)),
        "class" => (ModuleKind::Class, declaration_from_context(node)),
        _ => return None,
    };
    Some(Classification { kind, declaration })
}

fn method_kind(file: &SourceFile, method: Node<'_>) -> ModuleKind {
    if is_constructor(file, method) {
        return ModuleKind::Constructor;
    }
    if has_token(method, "get") {
        ModuleKind::Getter
    } else if has_token(method, "set") {
        ModuleKind::Setter
    } else {
        ModuleKind::Method
    }
}

fn is_class_member(node: Node<'_>) -> bool {
    node.parent().map(|p| p.kind() == "class_body").unwrap_or(false)
}

/// Method-like members that a class can declare, with or without a body.
pub fn is_method_like(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "method_definition" | "method_signature" | "abstract_method_signature"
    )
}

/// A method (or overload signature) named `constructor` directly inside a class body.
pub fn is_constructor(file: &SourceFile, method: Node<'_>) -> bool {
    if !is_method_like(method) || !is_class_member(method) {
        return false;
    }
    method
        .child_by_field_name("name")
        .map(|name| name.kind() == "property_identifier" && file.text_of(name) == "constructor")
        .unwrap_or(false)
}

/// Whether `node` has an anonymous keyword child such as `static`, `get` or `set`.
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

pub fn is_static_member(member: Node<'_>) -> bool {
    member.kind() == "class_static_block" || has_token(member, "static")
}

/// Infer the naming declaration of an anonymous function or class expression.
///
/// Parentheses are transparent. Recognized contexts: the initializer of a
/// variable with a plain identifier name, the value of an object property and
/// the value of a class field. Anything else (`export default () => {}`
/// included) stays anonymous and unindexed.
pub fn declaration_from_context(expression: Node<'_>) -> Option<Node<'_>> {
    let mut current = expression;
    let mut parent = current.parent()?;
    while parent.kind() == "parenthesized_expression" {
        current = parent;
        parent = parent.parent()?;
    }
    let is_value = parent.child_by_field_name("value") == Some(current);
    match parent.kind() {
        "variable_declarator" if is_value => parent
            .child_by_field_name("name")
            .filter(|name| name.kind() == "identifier")
            .map(|_| parent),
        "pair" | "public_field_definition" | "field_definition" if is_value => Some(parent),
        _ => None,
    }
}

/// The node carrying a declaration's name, if it has one.
pub fn declaration_name_node(declaration: Node<'_>) -> Option<Node<'_>> {
    let field = match declaration.kind() {
        "pair" => "key",
        "field_definition" => "property",
        _ => "name",
    };
    declaration.child_by_field_name(field)
}

/// Whether a property access is being written to.
///
/// Walks up through array-literal wrappers (`array`, and `array_pattern` as
/// tree-sitter parses a destructuring left-hand side) and reports `true` only
/// when the walk ends at the left side of a plain `=` assignment.
pub fn is_assignment_target(expression: Node<'_>) -> bool {
    let mut node = expression;
    while let Some(parent) = node.parent() {
        match parent.kind() {
            "assignment_expression" => {
                return parent.child_by_field_name("left") == Some(node);
            }
            "array" | "array_pattern" => node = parent,
            _ => return false,
        }
    }
    false
}

/// Drop surrounding quotes from a string-literal property name.
pub fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'"' | b'\'' | b'`') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// First named child that is not a comment.
pub fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::language::Language;
    use crate::domain::node_key::FileId;

    fn parse(text: &str) -> SourceFile {
        SourceFile::parse(FileId(0), "/virtual/t.ts", text.to_string(), Language::TypeScript).unwrap()
    }

    fn find<'t>(file: &'t SourceFile, kind: &str, nth: usize) -> Node<'t> {
        let mut found = Vec::new();
        let mut stack = vec![file.root()];
        while let Some(node) = stack.pop() {
            if node.kind() == kind {
                found.push(node);
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        found[nth]
    }

    fn kinds(text: &str) -> Vec<(ModuleKind, Option<String>)> {
        let file = parse(text);
        let mut out = Vec::new();
        let mut stack = vec![file.root()];
        while let Some(node) = stack.pop() {
            if let Some(c) = classify(&file, node) {
                let name = c
                    .declaration
                    .and_then(declaration_name_node)
                    .map(|n| file.text_of(n).to_string());
                out.push((c.kind, name));
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    #[test]
    fn test_class_members_classify() {
        let found = kinds(
            "class Dog { constructor() {} static {} bark() {} get x() { return 1 } set x(v) {} }",
        );
        let types: Vec<ModuleKind> = found.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            types,
            vec![
                ModuleKind::File,
                ModuleKind::Class,
                ModuleKind::Constructor,
                ModuleKind::Static,
                ModuleKind::Method,
                ModuleKind::Getter,
                ModuleKind::Setter,
            ]
        );
        assert_eq!(found[1].1.as_deref(), Some("Dog"));
        assert_eq!(found[4].1.as_deref(), Some("bark"));
    }

    #[test]
    fn test_bodiless_declarations_classify() {
        let found = kinds(
            r#"
declare function external(): void;
function pick(a: string): string;
function pick(a: any) { return a; }
interface Shape { area(): number; }
abstract class Base {
    constructor(a: string);
    constructor(a: any) {}
    abstract run(): void;
    abstract get size(): number;
    go(a: string): void;
    go(a: any) {}
}
"#,
        );
        let types: Vec<(ModuleKind, Option<&str>)> =
            found.iter().skip(1).map(|(k, n)| (*k, n.as_deref())).collect();
        assert_eq!(
            types,
            vec![
                (ModuleKind::Fn, Some("external")),
                (ModuleKind::Fn, Some("pick")),
                (ModuleKind::Fn, Some("pick")),
                (ModuleKind::Class, Some("Base")),
                (ModuleKind::Constructor, Some("constructor")),
                (ModuleKind::Constructor, Some("constructor")),
                (ModuleKind::Method, Some("run")),
                (ModuleKind::Getter, Some("size")),
                (ModuleKind::Method, Some("go")),
                (ModuleKind::Method, Some("go")),
            ]
        );
    }

    #[test]
    fn test_context_names() {
        let found = kinds("const x = (() => 1); const o = { run: function () {} }; class A { f = () => {} }");
        let names: Vec<Option<&str>> = found.iter().skip(1).map(|(_, n)| n.as_deref()).collect();
        assert_eq!(names, vec![Some("x"), Some("run"), Some("A"), Some("f")]);
    }

    #[test]
    fn test_no_context_is_anonymous() {
        let found = kinds("(() => {})(); [1].map(function (v) { return v; });");
        assert!(found.iter().skip(1).all(|(k, n)| *k == ModuleKind::Fn && n.is_none()));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_destructured_declarator_is_not_a_context() {
        let file = parse("const [a] = [() => 1];");
        let arrow = find(&file, "arrow_function", 0);
        assert!(declaration_from_context(arrow).is_none());
    }

    #[test]
    fn test_export_default_value_is_anonymous() {
        let file = parse("export default () => 1;");
        let arrow = find(&file, "arrow_function", 0);
        assert!(declaration_from_context(arrow).is_none());
    }

    #[test]
    fn test_method_named_constructor_in_object_is_a_method() {
        let found = kinds("const o = { constructor() {} };");
        assert_eq!(found.last().map(|(k, _)| *k), Some(ModuleKind::Method));
    }

    #[test]
    fn test_assignment_targets() {
        let file = parse("a.x = 1; [a.y] = [2]; [[a.z]] = [[3]]; a.w += 1; f(a.v); (a.u) = 4;");
        let members: Vec<(String, bool)> = (0..6)
            .map(|i| {
                let m = find(&file, "member_expression", i);
                (file.text_of(m).to_string(), is_assignment_target(m))
            })
            .collect();
        assert_eq!(
            members,
            vec![
                ("a.x".to_string(), true),
                ("a.y".to_string(), true),
                ("a.z".to_string(), true),
                ("a.w".to_string(), false),
                ("a.v".to_string(), false),
                ("a.u".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_assignment_right_side_is_a_read() {
        let file = parse("b = a.x;");
        assert!(!is_assignment_target(find(&file, "member_expression", 0)));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'./a'"), "./a");
        assert_eq!(unquote("\"b\""), "b");
        assert_eq!(unquote("c"), "c");
        assert_eq!(unquote("'"), "'");
    }
}
