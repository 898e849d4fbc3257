//! Text normalization (spec §3 `UnitText`).
//!
//! "Strip block and line comments, collapse runs of whitespace to
//! single spaces, canonicalize semicolons." The result feeds both
//! `normalized_hash` (exact-duplicate detection, spec invariant 1) and
//! the embedding pipeline's input text.

use crate::shared::ports::Language;
use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SEMICOLON_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*;\s*").unwrap());

struct CommentStyle {
    line: Option<&'static str>,
    block: bool,
}

fn comment_style(language: Language) -> CommentStyle {
    match language {
        Language::Python => CommentStyle {
            line: Some("#"),
            block: false,
        },
        Language::TypeScript
        | Language::JavaScript
        | Language::Java
        | Language::Go
        | Language::Rust
        | Language::Cpp
        | Language::CSharp => CommentStyle {
            line: Some("//"),
            block: true,
        },
    }
}

/// Strip comments, then collapse whitespace and canonicalize semicolon
/// spacing. Deliberately textual (not string-literal aware): this is a
/// best-effort normalization, not a re-lex, matching the spec's framing
/// of the whole engine as non-sound (§1 Non-goals).
pub fn normalize(raw_text: &str, language: Language) -> String {
    let style = comment_style(language);

    let mut text = if style.block {
        BLOCK_COMMENT.replace_all(raw_text, " ").into_owned()
    } else {
        raw_text.to_string()
    };

    if let Some(prefix) = style.line {
        text = strip_line_comments(&text, prefix);
    }

    let collapsed = WHITESPACE_RUN.replace_all(&text, " ");
    let canonical = SEMICOLON_SPACING.replace_all(&collapsed, ";");
    canonical.trim().to_string()
}

fn strip_line_comments(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| match line.find(prefix) {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
