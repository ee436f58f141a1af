mod common;

use common::{calls, find, root, Fixture};
use ts_callgraph::ModuleKind;

#[test]
fn imported_function_resolves_to_its_definition() {
    let fixture = Fixture::new(&[
        ("a.ts", "export function b() {}"),
        ("main.ts", "import { b } from './a';\nb();"),
    ]);
    let graph = fixture.analyze(&["a.ts", "main.ts"]);

    let b = find(&graph, ModuleKind::Fn, "b");
    assert_eq!(root(&graph, 1).called_modules, vec![b.id]);
    assert!(graph.children(root(&graph, 0)).any(|m| m.id == b.id));
}

#[test]
fn specifier_forms() {
    let fixture = Fixture::new(&[
        ("lib/util.ts", "export function one() {}\nexport const two = () => {};"),
        ("lib/index.ts", "export function three() {}"),
        (
            "main.ts",
            r#"
import { one } from "./lib/util.js";
import { two as second } from "./lib/util";
import { three } from "./lib";
one();
second();
three();
"#,
        ),
    ]);
    let graph = fixture.analyze(&["lib/util.ts", "lib/index.ts", "main.ts"]);
    assert_eq!(calls(&graph, root(&graph, 2)), vec!["fn one", "fn two", "fn three"]);
}

#[test]
fn reexports_and_barrels() {
    let fixture = Fixture::new(&[
        ("core.ts", "export function base() {}\nexport class Engine { constructor() {} start() {} }"),
        ("extra.ts", "export function bonus() {}"),
        (
            "index.ts",
            "export { base as renamed } from './core';\nexport * from './extra';\nexport { Engine } from './core';",
        ),
        (
            "main.ts",
            r#"
import { renamed, bonus, Engine } from "./index";
renamed();
bonus();
new Engine().start();
"#,
        ),
    ]);
    let graph = fixture.analyze(&["core.ts", "extra.ts", "index.ts", "main.ts"]);
    assert_eq!(
        calls(&graph, root(&graph, 3)),
        vec!["fn base", "fn bonus", "method start", "constructor constructor"]
    );
}

#[test]
fn namespace_and_default_imports() {
    let fixture = Fixture::new(&[
        ("math.ts", "export function add() {}\nexport default function sub() {}"),
        ("anon.ts", "export default () => {};"),
        ("local.ts", "class Store { get size() { return 0; } }\nexport default Store;"),
        (
            "main.ts",
            r#"
import * as math from "./math";
import minus from "./math";
import run from "./anon";
import Store from "./local";
math.add();
minus();
run();
const s: Store = new Store();
s.size;
"#,
        ),
    ]);
    let graph = fixture.analyze(&["math.ts", "anon.ts", "local.ts", "main.ts"]);

    let anonymous = graph
        .children(root(&graph, 1))
        .next()
        .unwrap();
    assert_eq!(anonymous.kind, ModuleKind::Fn);
    assert!(anonymous.name.is_none());
    // An anonymous default export is not a declaration, so `run()` has no target.
    assert_eq!(
        calls(&graph, root(&graph, 3)),
        vec!["fn add", "fn sub", "getter size"]
    );
    assert!(graph.callers_of(anonymous.id).is_empty());
}

#[test]
fn namespace_reexport() {
    let fixture = Fixture::new(&[
        ("shapes.ts", "export class Circle { constructor() {} }"),
        ("index.ts", "export * as shapes from './shapes';"),
        ("main.ts", "import { shapes } from './index';\nnew shapes.Circle();"),
    ]);
    let graph = fixture.analyze(&["shapes.ts", "index.ts", "main.ts"]);
    assert_eq!(calls(&graph, root(&graph, 2)), vec!["constructor constructor"]);
}

#[test]
fn import_cycles_terminate() {
    let fixture = Fixture::new(&[
        ("a.ts", "export * from './b';\nexport function a() {}"),
        ("b.ts", "export * from './a';"),
        ("main.ts", "import { missing, a } from './b';\nmissing();\na();"),
    ]);
    let graph = fixture.analyze(&["a.ts", "b.ts", "main.ts"]);
    assert_eq!(calls(&graph, root(&graph, 2)), vec!["fn a"]);
}

#[test]
fn cyclic_star_reexports_with_fan_out() {
    let fan_out = 6;
    let mut files: Vec<(String, String)> = Vec::new();
    let mut index = String::new();
    for i in 0..fan_out {
        index.push_str(&format!("export * from './m{i}';\n"));
        files.push((format!("m{i}.ts"), "export * from './index';\n".to_string()));
    }
    files[fan_out - 1].1.push_str("export function found() {}\n");
    files.push(("index.ts".to_string(), index));
    files.push((
        "main.ts".to_string(),
        "import { missing, found } from './index';\nmissing();\nfound();\nmissing();".to_string(),
    ));

    let entries: Vec<(&str, &str)> = files.iter().map(|(n, t)| (n.as_str(), t.as_str())).collect();
    let fixture = Fixture::new(&entries);
    let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
    let graph = fixture.analyze(&names);

    let main = root(&graph, names.len() - 1);
    assert_eq!(calls(&graph, main), vec!["fn found"]);
}

#[test]
fn files_outside_the_input_set_are_unresolved() {
    let fixture = Fixture::new(&[
        ("a.ts", "export function b() {}"),
        ("main.ts", "import { b } from './a';\nb();"),
    ]);
    let graph = fixture.analyze(&["main.ts"]);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn tsconfig_paths_and_base_url() {
    let fixture = Fixture::new(&[
        (
            "tsconfig.json",
            r#"{
  // module aliases
  "compilerOptions": {
    "baseUrl": "./src",
    "paths": { "@lib/*": ["lib/*"], },
  },
}"#,
        ),
        ("src/lib/math.ts", "export function add() {}"),
        ("src/shared.ts", "export function share() {}"),
        ("src/app.ts", "import { add } from '@lib/math';\nimport { share } from 'shared';\nadd();\nshare();"),
    ]);
    let graph = fixture.analyze(&["src/lib/math.ts", "src/shared.ts", "src/app.ts"]);
    assert_eq!(calls(&graph, root(&graph, 2)), vec!["fn add", "fn share"]);
}
