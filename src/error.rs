//! Fatal analysis errors.
//!
//! Anything listed here aborts the run; unresolved symbols are not errors.

use std::path::PathBuf;

use crate::domain::language::Language;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("cannot read project configuration {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse project configuration {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("cannot read source file {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot load {language} grammar: {message}")]
    Grammar { language: Language, message: String },

    #[error("parser produced no syntax tree for {}", .path.display())]
    Parse { path: PathBuf },
}
