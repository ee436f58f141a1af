mod common;

use std::fs;
use std::path::PathBuf;

use common::Fixture;
use ts_callgraph::api::dto::CallGraphDto;
use ts_callgraph::application::AnalyzeUsecase;
use ts_callgraph::infrastructure::{DotExporter, JsonExporter, ProjectConfig, ProjectLoader};
use ts_callgraph::{analyze, analyze_project, AnalyzeError};

#[test]
fn missing_configuration_is_fatal() {
    let fixture = Fixture::new(&[("main.ts", "function f() {}")]);
    let result = analyze(&[fixture.path("main.ts")], &fixture.path("absent.json"));
    assert!(matches!(result, Err(AnalyzeError::ConfigRead { .. })));
}

#[test]
fn malformed_configuration_is_fatal() {
    let fixture = Fixture::new(&[
        ("tsconfig.json", "{ \"compilerOptions\": { \"baseUrl\": } }"),
        ("main.ts", "function f() {}"),
    ]);
    let err = analyze(&[fixture.path("main.ts")], &fixture.config()).unwrap_err();
    assert!(matches!(err, AnalyzeError::ConfigParse { .. }));
    assert!(err.to_string().contains("tsconfig.json"));
}

#[test]
fn unreadable_source_is_fatal() {
    let fixture = Fixture::new(&[]);
    let result = analyze(&[fixture.path("gone.ts")], &fixture.config());
    assert!(matches!(result, Err(AnalyzeError::SourceRead { .. })));
}

#[test]
fn syntax_errors_do_not_abort() {
    let fixture = Fixture::new(&[("broken.ts", "function ok() {}\nfunction bad( {\nok();")]);
    let graph = fixture.analyze(&["broken.ts"]);
    assert!(!graph.find_by_name("ok").is_empty());
}

#[test]
fn usecase_writes_json() {
    let fixture = Fixture::new(&[(
        "main.ts",
        "class Dog { constructor() {} }\nconst make = () => new Dog();\nmake();",
    )]);
    let usecase = AnalyzeUsecase {
        exporter: &JsonExporter,
    };
    let mut out = Vec::new();
    let graph = usecase
        .run(&[fixture.path("main.ts")], &fixture.config(), &mut out)
        .unwrap();

    let dto: CallGraphDto = serde_json::from_slice(&out).unwrap();
    assert_eq!(dto.module_map.len(), graph.len());
    let root = &dto.root_modules[0];
    assert_eq!(root.children.len(), 2);
    let make = &root.children[1];
    assert_eq!(make.name.as_deref(), Some("make"));
    let ctor = &dto.module_map[&make.called_modules[0]];
    assert_eq!(ctor.name.as_deref(), Some("constructor"));
    assert_eq!(root.called_modules, vec![make.id.clone()]);
}

#[test]
fn usecase_writes_dot() {
    let fixture = Fixture::new(&[("main.ts", "function a() { b(); }\nfunction b() {}")]);
    let usecase = AnalyzeUsecase {
        exporter: &DotExporter,
    };
    let mut out = Vec::new();
    let graph = usecase
        .run(&[fixture.path("main.ts")], &fixture.config(), &mut out)
        .unwrap();
    let dot = String::from_utf8(out).unwrap();
    let a = graph.find_by_name("a")[0].id;
    let b = graph.find_by_name("b")[0].id;
    assert!(dot.contains(&format!("\"{a}\" -> \"{b}\";")), "{dot}");
}

#[test]
fn in_memory_projects() {
    let sources: Vec<(PathBuf, String)> = vec![
        ("/virtual/a.ts".into(), "export function hello() {}".to_string()),
        ("/virtual/b.ts".into(), "import { hello } from './a';\nhello();".to_string()),
    ];
    let project = ProjectLoader::from_sources(sources, ProjectConfig::default()).unwrap();
    let graph = analyze_project(&project);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn extends_chain_supplies_paths() {
    let fixture = Fixture::new(&[
        (
            "configs/base.json",
            r#"{ "compilerOptions": { "baseUrl": "..", "paths": { "~/*": ["src/*"] } } }"#,
        ),
        ("tsconfig.json", r#"{ "extends": "./configs/base.json" }"#),
        ("src/tools.ts", "export function tool() {}"),
        ("main.ts", "import { tool } from '~/tools';\ntool();"),
    ]);
    let graph = fixture.analyze(&["src/tools.ts", "main.ts"]);
    assert_eq!(graph.edge_count(), 1);
    fs::remove_file(fixture.path("configs/base.json")).unwrap();
    let err = analyze(&[fixture.path("main.ts")], &fixture.config()).unwrap_err();
    assert!(matches!(err, AnalyzeError::ConfigRead { .. }));
}
