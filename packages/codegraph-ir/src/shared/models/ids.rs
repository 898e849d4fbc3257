//! Content-addressed identifier derivation.
//!
//! `unit_id` is derived from `(file_path, kind, qualified_name, start_line)`
//! per spec §3, so cosmetic edits that preserve AST structure (and hence
//! `qualified_name`/`start_line`) do not churn ids, while file renames do
//! (matching spec scenario 3: "the unit_id changes because file_path is
//! part of it").

use sha2::{Digest, Sha256};

/// SHA-256 of raw bytes, hex-encoded. Used for `File::content_hash`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Streaming SHA-256, for the scanner's streaming hash requirement
/// (spec §4.2 "Compute content_hash with a streaming SHA-256").
pub struct StreamingHasher(Sha256);

impl StreamingHasher {
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.0.update(chunk);
    }

    pub fn finalize_hex(self) -> String {
        hex::encode(self.0.finalize())
    }
}

impl Default for StreamingHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a stable `unit_id` from a unit's identity fields.
pub fn unit_id(file_path: &str, kind: &str, qualified_name: &str, start_line: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_path.as_bytes());
    hasher.update(b"\0");
    hasher.update(kind.as_bytes());
    hasher.update(b"\0");
    hasher.update(qualified_name.as_bytes());
    hasher.update(b"\0");
    hasher.update(start_line.to_le_bytes());
    hex::encode(hasher.finalize())
}

/// `normalized_hash` — SHA-256 of the normalized unit text (spec §3).
pub fn normalized_hash(normalized_text: &str) -> String {
    sha256_hex(normalized_text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_id_stable_across_cosmetic_edits() {
        let a = unit_id("src/a.py", "function", "mod.f", 3);
        let b = unit_id("src/a.py", "function", "mod.f", 3);
        assert_eq!(a, b);
    }

    #[test]
    fn unit_id_changes_on_rename() {
        let a = unit_id("src/a.py", "function", "mod.f", 3);
        let b = unit_id("src/a2.py", "function", "mod.f", 3);
        assert_ne!(a, b);
    }

    #[test]
    fn normalized_hash_is_sha256_of_text() {
        let h1 = normalized_hash("def f(x): return x");
        let h2 = normalized_hash("def f(x): return x");
        let h3 = normalized_hash("def f(y): return y");
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_eq!(h1.len(), 64);
    }
}
