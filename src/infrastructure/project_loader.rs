use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::domain::language::Language;
use crate::domain::node_key::FileId;
use crate::domain::source::SourceFile;
use crate::error::AnalyzeError;
use crate::infrastructure::module_resolution::normalize;
use crate::infrastructure::tsconfig::ProjectConfig;

/// Parsed input files plus the configuration they are analyzed under.
#[derive(Debug)]
pub struct Project {
    pub config: ProjectConfig,
    /// In input order; `files[i].id == FileId(i)`.
    pub files: Vec<SourceFile>,
}

pub struct ProjectLoader;

impl ProjectLoader {
    /// Load the configuration, then read and parse every input file.
    pub fn load<P: AsRef<Path>>(paths: &[P], config_path: &Path) -> Result<Project, AnalyzeError> {
        let config = ProjectConfig::load(config_path)?;
        Self::load_with_config(paths, config)
    }

    pub fn load_with_config<P: AsRef<Path>>(
        paths: &[P],
        config: ProjectConfig,
    ) -> Result<Project, AnalyzeError> {
        let inputs = Self::input_paths(paths);
        let sources = inputs
            .into_par_iter()
            .map(|path| match fs::read_to_string(&path) {
                Ok(text) => Ok((path, text)),
                Err(source) => Err(AnalyzeError::SourceRead { path, source }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_sources(sources, config)
    }

    /// Parse in-memory sources. Paths are used as given.
    pub fn from_sources(
        sources: Vec<(PathBuf, String)>,
        config: ProjectConfig,
    ) -> Result<Project, AnalyzeError> {
        let files = sources
            .into_par_iter()
            .enumerate()
            .map(|(index, (path, text))| {
                let language = Language::from_path(&path).unwrap_or_default();
                SourceFile::parse(FileId(index as u32), path, text, language)
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(files = files.len(), "project parsed");
        Ok(Project { config, files })
    }

    /// Absolute, deduplicated input paths with `node_modules` dropped.
    /// The first occurrence of a path keeps its position.
    fn input_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for path in paths {
            let path = normalize(path.as_ref());
            if in_node_modules(&path) {
                tracing::debug!(path = %path.display(), "skipping dependency file");
                continue;
            }
            if seen.insert(path.clone()) {
                out.push(path);
            }
        }
        out
    }

    /// Expand CLI inputs: explicit files plus glob matches, filtered to
    /// supported source extensions.
    pub fn discover(files: &[PathBuf], patterns: &[String]) -> Result<Vec<PathBuf>> {
        let mut out: Vec<PathBuf> = files
            .iter()
            .filter(|p| Language::is_supported(p))
            .cloned()
            .collect();
        for pattern in patterns {
            let matches = glob::glob(pattern).with_context(|| format!("Invalid glob pattern {pattern}"))?;
            for entry in matches {
                let path = entry.with_context(|| format!("Failed to read glob match for {pattern}"))?;
                if path.is_file() && Language::is_supported(&path) && !in_node_modules(&path) {
                    out.push(path);
                }
            }
        }
        Ok(out)
    }
}

fn in_node_modules(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "node_modules")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_preserves_order_and_dedups() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.ts");
        let b = dir.path().join("b.js");
        fs::write(&a, "export const a = 1;").unwrap();
        fs::write(&b, "module.exports = {};").unwrap();
        let again = dir.path().join("sub/../a.ts");

        let project = ProjectLoader::load_with_config(&[b.clone(), a.clone(), again], ProjectConfig::default()).unwrap();
        let paths: Vec<&Path> = project.files.iter().map(|f| f.path()).collect();
        assert_eq!(paths, vec![b.as_path(), a.as_path()]);
        assert_eq!(project.files[0].language, Language::JavaScript);
        assert_eq!(project.files[1].id, FileId(1));
    }

    #[test]
    fn test_unreadable_input_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.ts");
        let err = ProjectLoader::load_with_config(&[missing], ProjectConfig::default()).unwrap_err();
        assert!(matches!(err, AnalyzeError::SourceRead { .. }));
    }

    #[test]
    fn test_discover_filters() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.ts"), "").unwrap();
        fs::write(dir.path().join("main.ts"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();

        let pattern = format!("{}/**/*", dir.path().display());
        let found = ProjectLoader::discover(&[dir.path().join("README.md")], &[pattern]).unwrap();
        assert_eq!(found, vec![dir.path().join("main.ts")]);
    }
}
