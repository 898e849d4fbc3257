//! Context-augmentation templates (spec §4.5).
//!
//! "The exact template is part of the model key: changing the template
//! invalidates cached embeddings" — so this is a pure function of
//! structured input (REDESIGN FLAGS §9 "Embedded string-interpolation
//! templates for prompt-like contexts... Define the template as a pure
//! function of structured input").

use crate::domain::{Unit, UnitKind};

/// One unit's text plus the structured fields the embedding template
/// is built from.
#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub unit_id: String,
    pub normalized_text: String,
    pub context_hints: ContextHints,
}

#[derive(Debug, Clone, Default)]
pub struct ContextHints {
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub params: Vec<String>,
    pub return_type: Option<String>,
    pub calls: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub methods: Vec<String>,
}

/// Template version string, embedded in the cache key alongside
/// `model_id` so a template edit invalidates every cached embedding.
pub const TEMPLATE_VERSION: &str = "ctx-template-v1";

/// Build the embedded text for a unit (spec §4.5 "Context
/// augmentation"): the method template for methods/functions, the
/// class template for classes, and the normalized source verbatim for
/// blocks (no richer context to augment with).
pub fn build_embedding_text(unit: &Unit, normalized_text: &str) -> String {
    match unit.kind {
        UnitKind::Method | UnitKind::Function => {
            let class = unit.parent_class.as_deref().unwrap_or("");
            let params = unit
                .parameters
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let ret = unit.return_type.as_deref().unwrap_or("");
            let calls = unit
                .calls_to
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Class: {class}\nMethod: {name}\nParams: {params}\nReturns: {ret}\nCalls: {calls}\n\nCode:\n{code}",
                class = class,
                name = unit.name,
                params = params,
                ret = ret,
                calls = calls,
                code = normalized_text
            )
        }
        UnitKind::Class => format!(
            "Class: {name}\nExtends: {base}\nImplements: {ifaces}\nMethods: {methods}\n\nCode:\n{code}",
            name = unit.name,
            base = "",
            ifaces = "",
            methods = "",
            code = normalized_text
        ),
        UnitKind::Block => format!("Code:\n{normalized_text}"),
    }
}
