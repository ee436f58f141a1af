//! Import specifier → analyzed file.
//!
//! Resolution only ever lands on files that are part of the current run;
//! anything else (packages, files outside the input set) is unresolved.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::domain::node_key::FileId;
use crate::domain::source::SourceFile;
use crate::infrastructure::tsconfig::ProjectConfig;

const EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".d.ts", ".js", ".jsx", ".mts", ".cts", ".mjs", ".cjs",
];

/// Emitted JavaScript extension → the TypeScript sources it may come from.
const SCRIPT_SOURCES: &[(&str, &[&str])] = &[
    (".js", &[".ts", ".tsx"]),
    (".jsx", &[".tsx"]),
    (".mjs", &[".mts"]),
    (".cjs", &[".cts"]),
];

/// Make `path` absolute and fold `.`/`..` components without touching the
/// filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[derive(Debug)]
pub struct ModuleResolver {
    by_path: HashMap<PathBuf, FileId>,
    config: ProjectConfig,
}

impl ModuleResolver {
    pub fn new(files: &[SourceFile], config: ProjectConfig) -> Self {
        let by_path = files
            .iter()
            .map(|f| (normalize(&f.path), f.id))
            .collect();
        Self { by_path, config }
    }

    /// Resolve `specifier` as imported from `from`.
    pub fn resolve(&self, from: &Path, specifier: &str) -> Option<FileId> {
        if specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".." {
            let dir = from.parent()?;
            return self.probe(&dir.join(specifier));
        }
        if specifier.starts_with('/') {
            return self.probe(Path::new(specifier));
        }
        self.resolve_non_relative(specifier)
    }

    fn resolve_non_relative(&self, specifier: &str) -> Option<FileId> {
        if let Some(base) = &self.config.paths_base {
            for (pattern, targets) in &self.config.paths {
                let Some(captured) = match_pattern(pattern, specifier) else {
                    continue;
                };
                for target in targets {
                    let substituted = target.replacen('*', captured, 1);
                    if let Some(found) = self.probe(&base.join(substituted)) {
                        return Some(found);
                    }
                }
            }
        }
        let base_url = self.config.base_url.as_ref()?;
        self.probe(&base_url.join(specifier))
    }

    /// Try the path as given, with each extension, as a directory index, and
    /// with a JavaScript extension swapped for its TypeScript source.
    fn probe(&self, candidate: &Path) -> Option<FileId> {
        let candidate = normalize(candidate);
        if let Some(id) = self.by_path.get(&candidate) {
            return Some(*id);
        }
        let text = candidate.to_string_lossy();
        for ext in EXTENSIONS {
            if let Some(id) = self.by_path.get(Path::new(&format!("{text}{ext}"))) {
                return Some(*id);
            }
        }
        for ext in EXTENSIONS {
            if let Some(id) = self.by_path.get(&candidate.join(format!("index{ext}"))) {
                return Some(*id);
            }
        }
        for (js, replacements) in SCRIPT_SOURCES {
            if let Some(stem) = text.strip_suffix(js) {
                for ts in *replacements {
                    if let Some(id) = self.by_path.get(Path::new(&format!("{stem}{ts}"))) {
                        return Some(*id);
                    }
                }
            }
        }
        None
    }
}

/// Match a `paths` key with at most one `*`, returning the captured part.
fn match_pattern<'s>(pattern: &str, specifier: &'s str) -> Option<&'s str> {
    match pattern.split_once('*') {
        None => (pattern == specifier).then_some(""),
        Some((prefix, suffix)) => {
            if specifier.len() >= prefix.len() + suffix.len()
                && specifier.starts_with(prefix)
                && specifier.ends_with(suffix)
            {
                Some(&specifier[prefix.len()..specifier.len() - suffix.len()])
            } else {
                None
            }
        }
    }
}
