//! Token-set similarity components and pair classification (spec §4.7).

use crate::config::DuplicateThresholds;
use crate::domain::DuplicateType;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Control-flow, declaration, and punctuation tokens counted toward
/// `sim_struct` (spec §4.7).
static CONTROL_FLOW_TOKENS: &[&str] = &[
    "if", "else", "for", "while", "switch", "case", "try", "catch", "finally",
];
static DECLARATION_TOKENS: &[&str] = &["function", "class", "interface", "enum", "type"];
static PUNCTUATION_TOKENS: &[&str] = &["{", "}", "(", ")", ";", ","];

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "is", "are", "of", "to", "in", "and", "or", "self", "this",
    ]
    .into_iter()
    .collect()
});

/// Split normalized source into identifier / keyword / numeric / string
/// tokens, stopword-filtered (spec §4.7 `sim_tok`).
pub fn tokenize(normalized_text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut string_quote = ' ';

    for ch in normalized_text.chars() {
        if in_string {
            if ch == string_quote {
                in_string = false;
                if !current.is_empty() {
                    tokens.insert(current.clone());
                    current.clear();
                }
            } else {
                current.push(ch);
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                if !current.is_empty() {
                    push_token(&mut tokens, &current);
                    current.clear();
                }
                in_string = true;
                string_quote = ch;
            }
            c if c.is_alphanumeric() || c == '_' => current.push(c),
            _ => {
                if !current.is_empty() {
                    push_token(&mut tokens, &current);
                    current.clear();
                }
            }
        }
    }
    if !current.is_empty() {
        push_token(&mut tokens, &current);
    }
    tokens
}

fn push_token(tokens: &mut HashSet<String>, raw: &str) {
    let lowered = raw.to_lowercase();
    if !STOPWORDS.contains(lowered.as_str()) {
        tokens.insert(lowered);
    }
}

/// Jaccard index over two token sets. Empty/empty is defined as `0.0`
/// (no evidence of similarity, not maximal similarity).
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Structural-token multiset extraction for `sim_struct` (spec §4.7).
/// Unlike `tokenize`, this keeps only the fixed structural vocabulary
/// and counts occurrences (a multiset, via a sorted `Vec`) so repeated
/// braces/keywords carry weight.
pub fn structural_tokens(normalized_text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for ch in normalized_text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            word.push(ch);
        } else {
            flush_word(&mut tokens, &mut word);
            let s = ch.to_string();
            if PUNCTUATION_TOKENS.contains(&s.as_str()) {
                tokens.push(s);
            }
        }
    }
    flush_word(&mut tokens, &mut word);
    tokens
}

fn flush_word(tokens: &mut Vec<String>, word: &mut String) {
    if !word.is_empty() {
        let lowered = word.to_lowercase();
        if CONTROL_FLOW_TOKENS.contains(&lowered.as_str()) || DECLARATION_TOKENS.contains(&lowered.as_str()) {
            tokens.push(lowered);
        }
        word.clear();
    }
}

/// Jaccard over structural-token multisets, treated as sets of
/// `(token, occurrence_index)` so repeated tokens aren't collapsed into
/// one membership.
pub fn sim_struct(a: &str, b: &str) -> f64 {
    let to_set = |tokens: Vec<String>| -> HashSet<String> {
        tokens
            .into_iter()
            .enumerate()
            .map(|(i, t)| format!("{t}#{i}"))
            .collect()
    };
    let a_set = to_set(structural_tokens(a));
    let b_set = to_set(structural_tokens(b));
    jaccard(&a_set, &b_set)
}

pub fn sim_tok(a: &str, b: &str) -> f64 {
    jaccard(&tokenize(a), &tokenize(b))
}

/// Classify a unit pair by the cascade in spec §4.7: exact short-
/// circuits, then semantic (`sim_cos`), then structural. `sim_cos` is
/// `None` in degraded mode (no embeddings available), which falls the
/// pair straight through to the structural branch.
pub fn classify_pair(
    exact_match: bool,
    sim_cos: Option<f64>,
    sim_struct: f64,
    thresholds: &DuplicateThresholds,
) -> Option<(DuplicateType, f64)> {
    if exact_match {
        return Some((DuplicateType::Exact, 1.0));
    }
    if let Some(cos) = sim_cos {
        if cos >= thresholds.t_semantic {
            return Some((DuplicateType::Semantic, cos));
        }
    }
    if sim_struct >= thresholds.t_structural {
        return Some((DuplicateType::Structural, sim_struct));
    }
    None
}
