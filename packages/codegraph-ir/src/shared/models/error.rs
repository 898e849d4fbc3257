//! Unified error type for the codegraph-ir crate.
//!
//! Mirrors the pipeline stages of spec §7: each `ErrorKind` corresponds
//! to a stage that can fail independently without aborting the whole run.

use std::fmt;

/// Error kind categorization, one per pipeline stage (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File Scanner (C1) failures.
    Scan,
    /// Change Ledger (C2) failures.
    Ledger,
    /// Parse errors, non-fatal per-file (spec §4.3, §7).
    Parse,
    /// Unit/edge extraction failures beyond parsing itself.
    Extraction,
    /// Multi-tier cache failures (never fatal to the pipeline, spec §4.4).
    Cache,
    /// Embedding pipeline / provider failures.
    Embedding,
    /// Vector store failures.
    VectorStore,
    /// Similarity & duplication engine failures.
    Similarity,
    /// Relationship graph failures.
    Graph,
    /// Configuration errors (fatal at init, spec §7).
    Config,
    /// I/O errors.
    Io,
    /// Persistence-layer errors bridged from `codegraph-storage`.
    Storage,
    /// Internal invariant violations (bugs).
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Scan => "scan",
            ErrorKind::Ledger => "ledger",
            ErrorKind::Parse => "parse",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Cache => "cache",
            ErrorKind::Embedding => "embedding",
            ErrorKind::VectorStore => "vector_store",
            ErrorKind::Similarity => "similarity",
            ErrorKind::Graph => "graph",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
            ErrorKind::Storage => "storage",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Crate-wide error type.
#[derive(Debug)]
pub struct CodegraphError {
    pub kind: ErrorKind,
    pub message: String,
    pub file_path: Option<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CodegraphError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file_path: None,
            source: None,
        }
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn scan(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Scan, message)
    }

    pub fn ledger(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Ledger, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Extraction, message)
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    pub fn embedding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Embedding, message)
    }

    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VectorStore, message)
    }

    pub fn similarity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Similarity, message)
    }

    pub fn graph(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Graph, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Display for CodegraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(ref file) = self.file_path {
            write!(f, " in {}", file)?;
        }
        Ok(())
    }
}

impl std::error::Error for CodegraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T> = std::result::Result<T, CodegraphError>;

impl From<std::io::Error> for CodegraphError {
    fn from(err: std::io::Error) -> Self {
        CodegraphError::new(ErrorKind::Io, format!("I/O error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for CodegraphError {
    fn from(err: serde_json::Error) -> Self {
        CodegraphError::new(ErrorKind::Config, format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<serde_yaml::Error> for CodegraphError {
    fn from(err: serde_yaml::Error) -> Self {
        CodegraphError::config(format!("YAML error: {}", err)).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_message_and_file() {
        let err = CodegraphError::parse("unexpected token").with_file("a.py");
        let msg = format!("{}", err);
        assert!(msg.contains("parse"));
        assert!(msg.contains("unexpected token"));
        assert!(msg.contains("a.py"));
    }

    #[test]
    fn source_chain_preserved() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = CodegraphError::scan("cannot read dir").with_source(io_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
