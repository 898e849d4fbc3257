//! Fallback line-window block extractor (spec §4.3 Failure: "Parse
//! errors do not abort the file; the extractor falls back to a
//! line-window block extractor that emits block units without edges").

use crate::domain::{Unit, UnitKind};
use crate::features::extraction::domain::normalize;
use crate::shared::models::normalized_hash;
use crate::shared::ports::Language;

/// Chunk `content` into contiguous `min_block_lines`-sized windows and
/// emit each as a `Block` unit, with no calls/edges. Used when parsing
/// fails entirely, or when a file's language plugin isn't registered.
pub fn extract_blocks(file_path: &str, content: &str, language: Language, min_block_lines: u32) -> Vec<Unit> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }
    let window = min_block_lines.max(1) as usize;
    let mut units = Vec::new();
    let mut start = 0usize;
    while start < lines.len() {
        let end = (start + window).min(lines.len());
        if (end - start) as u32 >= min_block_lines {
            let raw_text = lines[start..end].join("\n");
            let normalized = normalize(&raw_text, language);
            let hash = normalized_hash(&normalized);
            let start_line = start as u32 + 1;
            let end_line = end as u32;
            let label = format!("block@{start_line}");
            units.push(Unit::new(
                file_path,
                UnitKind::Block,
                label.clone(),
                label,
                start_line,
                end_line,
                language,
                raw_text,
                hash,
            ));
        }
        start = end;
    }
    units
}
