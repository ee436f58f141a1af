//! Language Domain Module
//!
//! Source dialects understood by the analyzer and the tree-sitter grammar for each.

use std::path::Path;

/// Supported source dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    TypeScript,
    Tsx,
    JavaScript,
}

impl Language {
    /// Infer language from file extension.
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext.to_lowercase().as_str() {
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            _ => None,
        }
    }

    /// Infer language from a file path.
    pub fn from_path(path: &Path) -> Option<Language> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Get the display name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::JavaScript => "JavaScript",
        }
    }

    /// Whether a path has an extension any supported language claims.
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_some()
    }

    /// The tree-sitter grammar used to parse this dialect.
    pub fn grammar(&self) -> tree_sitter::Language {
        match self {
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("mts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("tsx"), Some(Language::Tsx));
        assert_eq!(Language::from_extension("cjs"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path(Path::new("src/index.ts")), Some(Language::TypeScript));
        assert_eq!(Language::from_path(Path::new("app.jsx")), Some(Language::JavaScript));
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
        assert!(!Language::is_supported(Path::new("README.md")));
    }

    #[test]
    fn test_grammars_load() {
        for language in [Language::TypeScript, Language::Tsx, Language::JavaScript] {
            let mut parser = tree_sitter::Parser::new();
            assert!(parser.set_language(&language.grammar()).is_ok(), "{}", language);
        }
    }
}
