//! Cache key derivation (spec §4.4 "Key").

use crate::shared::models::sha256_hex;
use crate::shared::ports::Language;

/// `sha256(normalized_text) || model_id` — the embedding cache key.
pub fn embedding_key(normalized_text: &str, model_id: &str) -> String {
    format!("{}:{}", sha256_hex(normalized_text.as_bytes()), model_id)
}

/// `sha256(content) || language` — the parsed-unit cache key.
pub fn parsed_key(content: &str, language: Language) -> String {
    format!("{}:{}", sha256_hex(content.as_bytes()), language.name())
}
