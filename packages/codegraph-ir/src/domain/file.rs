//! `File` entity (spec §3).

use crate::shared::ports::Language;
use serde::{Deserialize, Serialize};

/// A source file discovered by the scanner and tracked by the ledger.
///
/// Unique key is `path` within a project scope (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: String,
    pub content_hash: String,
    pub size: u64,
    pub last_modified: i64,
    pub language: Option<Language>,
}

impl File {
    pub fn new(
        path: impl Into<String>,
        content_hash: impl Into<String>,
        size: u64,
        last_modified: i64,
    ) -> Self {
        let path = path.into();
        let language = Language::from_file_path(&path);
        Self {
            path,
            content_hash: content_hash.into(),
            size,
            last_modified,
            language,
        }
    }
}
