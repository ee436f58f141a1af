//! Project configuration (`tsconfig.json`).
//!
//! Only the options that affect module resolution are read: `baseUrl`,
//! `paths` and relative `extends` chains. The file is JSON with comments and
//! trailing commas, which are stripped before handing it to serde_json.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::AnalyzeError;
use crate::infrastructure::module_resolution::normalize;

#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    /// The configuration file this was loaded from.
    pub path: PathBuf,
    pub base_url: Option<PathBuf>,
    pub paths: IndexMap<String, Vec<String>>,
    /// Directory `paths` targets are relative to: `baseUrl` if set, else the
    /// directory of the config that declared `paths`.
    pub paths_base: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    paths: Option<IndexMap<String, Vec<String>>>,
}

impl ProjectConfig {
    /// Load and merge a configuration file and its relative `extends` chain.
    pub fn load(path: &Path) -> Result<Self, AnalyzeError> {
        let path = normalize(path);
        let mut config = ProjectConfig {
            path: path.clone(),
            ..ProjectConfig::default()
        };
        let mut seen = HashSet::new();
        config.merge_file(&path, &mut seen)?;
        if let (Some(base), Some(_)) = (&config.base_url, &config.paths_base) {
            config.paths_base = Some(base.clone());
        }
        tracing::debug!(
            path = %config.path.display(),
            base_url = ?config.base_url,
            paths = config.paths.len(),
            "project configuration loaded"
        );
        Ok(config)
    }

    /// Apply `path` on top of its parents: parents first, then this file.
    fn merge_file(&mut self, path: &Path, seen: &mut HashSet<PathBuf>) -> Result<(), AnalyzeError> {
        if !seen.insert(path.to_path_buf()) {
            return Ok(());
        }
        let text = std::fs::read_to_string(path).map_err(|source| AnalyzeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig =
            serde_json::from_str(&strip_jsonc(&text)).map_err(|e| AnalyzeError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let dir = path.parent().unwrap_or(Path::new("/")).to_path_buf();

        let parents = match raw.extends {
            Some(Extends::One(parent)) => vec![parent],
            Some(Extends::Many(parents)) => parents,
            None => Vec::new(),
        };
        for parent in parents {
            if !(parent.starts_with("./") || parent.starts_with("../") || parent.starts_with('/')) {
                tracing::debug!(extends = %parent, "skipping package configuration base");
                continue;
            }
            let mut parent_path = normalize(&dir.join(&parent));
            if parent_path.extension().is_none() {
                parent_path.set_extension("json");
            }
            self.merge_file(&parent_path, seen)?;
        }

        if let Some(base_url) = raw.compiler_options.base_url {
            self.base_url = Some(normalize(&dir.join(base_url)));
        }
        if let Some(paths) = raw.compiler_options.paths {
            self.paths = paths;
            self.paths_base = Some(dir);
        }
        Ok(())
    }
}

/// Remove `//` and `/* */` comments and trailing commas, leaving strings intact.
pub fn strip_jsonc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                out.push(' ');
            }
            ']' | '}' => {
                let trimmed = out.trim_end_matches(char::is_whitespace).len();
                if out[..trimmed].ends_with(',') {
                    out.truncate(trimmed - 1);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
