//! Per-language AST shape tables driving the generic tree-sitter
//! walker (`tree_sitter_walker.rs`).
//!
//! The teacher's own `TreeSitterParser` dispatches by matching
//! `node.kind()` strings rather than compiling a tree-sitter `Query`
//! per construct (see `map_node_kind` in its Python parser); this
//! table generalizes that same by-string-match dispatch across all
//! eight languages instead of hand-writing a parser per language.

use crate::shared::ports::Language;

/// The node-kind names (and field names) a single language grammar
/// uses for the constructs the extractor cares about.
pub struct LangSyntax {
    pub function_kinds: &'static [&'static str],
    pub method_kinds: &'static [&'static str],
    pub class_kinds: &'static [&'static str],
    pub call_kinds: &'static [&'static str],
    pub import_kinds: &'static [&'static str],
    /// Control-flow/compound-statement node kinds eligible to become
    /// standalone `Block` units when large enough (spec §4.3: "Block
    /// units capture brace-delimited regions of at least
    /// MIN_BLOCK_LINES").
    pub block_kinds: &'static [&'static str],
    pub name_field: &'static str,
    pub params_field: &'static str,
    pub return_field: Option<&'static str>,
    pub body_field: &'static str,
    pub extends_field: Option<&'static str>,
    pub implements_field: Option<&'static str>,
    pub call_target_field: &'static str,
}

pub fn syntax_for(language: Language) -> &'static LangSyntax {
    match language {
        Language::Python => &PYTHON,
        Language::TypeScript => &TYPESCRIPT,
        Language::JavaScript => &JAVASCRIPT,
        Language::Java => &JAVA,
        Language::Go => &GO,
        Language::Rust => &RUST,
        Language::Cpp => &CPP,
        Language::CSharp => &CSHARP,
    }
}

static PYTHON: LangSyntax = LangSyntax {
    function_kinds: &["function_definition"],
    method_kinds: &[],
    class_kinds: &["class_definition"],
    call_kinds: &["call"],
    import_kinds: &["import_statement", "import_from_statement"],
    block_kinds: &[
        "if_statement",
        "for_statement",
        "while_statement",
        "try_statement",
        "with_statement",
    ],
    name_field: "name",
    params_field: "parameters",
    return_field: Some("return_type"),
    body_field: "body",
    extends_field: Some("superclasses"),
    implements_field: None,
    call_target_field: "function",
};

static JAVASCRIPT: LangSyntax = LangSyntax {
    function_kinds: &[
        "function_declaration",
        "function_expression",
        "generator_function_declaration",
        "arrow_function",
    ],
    method_kinds: &["method_definition"],
    class_kinds: &["class_declaration"],
    call_kinds: &["call_expression"],
    import_kinds: &["import_statement"],
    block_kinds: &[
        "if_statement",
        "for_statement",
        "for_in_statement",
        "while_statement",
        "try_statement",
        "switch_statement",
    ],
    name_field: "name",
    params_field: "parameters",
    return_field: None,
    body_field: "body",
    extends_field: Some("heritage"),
    implements_field: None,
    call_target_field: "function",
};

static TYPESCRIPT: LangSyntax = LangSyntax {
    function_kinds: &[
        "function_declaration",
        "function_expression",
        "generator_function_declaration",
        "arrow_function",
    ],
    method_kinds: &["method_definition", "method_signature"],
    class_kinds: &["class_declaration", "interface_declaration"],
    call_kinds: &["call_expression"],
    import_kinds: &["import_statement"],
    block_kinds: &[
        "if_statement",
        "for_statement",
        "for_in_statement",
        "while_statement",
        "try_statement",
        "switch_statement",
    ],
    name_field: "name",
    params_field: "parameters",
    return_field: Some("return_type"),
    body_field: "body",
    extends_field: Some("heritage"),
    implements_field: None,
    call_target_field: "function",
};

static JAVA: LangSyntax = LangSyntax {
    function_kinds: &[],
    method_kinds: &["method_declaration", "constructor_declaration"],
    class_kinds: &["class_declaration", "interface_declaration", "enum_declaration"],
    call_kinds: &["method_invocation", "object_creation_expression"],
    import_kinds: &["import_declaration"],
    block_kinds: &[
        "if_statement",
        "for_statement",
        "while_statement",
        "try_statement",
        "switch_expression",
    ],
    name_field: "name",
    params_field: "parameters",
    return_field: Some("type"),
    body_field: "body",
    extends_field: Some("superclass"),
    implements_field: Some("interfaces"),
    call_target_field: "name",
};

static GO: LangSyntax = LangSyntax {
    function_kinds: &["function_declaration"],
    method_kinds: &["method_declaration"],
    class_kinds: &["type_declaration"],
    call_kinds: &["call_expression"],
    import_kinds: &["import_spec"],
    block_kinds: &["if_statement", "for_statement"],
    name_field: "name",
    params_field: "parameters",
    return_field: Some("result"),
    body_field: "body",
    extends_field: None,
    implements_field: None,
    call_target_field: "function",
};

static RUST: LangSyntax = LangSyntax {
    function_kinds: &["function_item"],
    method_kinds: &["function_item"],
    class_kinds: &["struct_item", "enum_item", "trait_item"],
    call_kinds: &["call_expression"],
    import_kinds: &["use_declaration"],
    block_kinds: &[
        "if_expression",
        "for_expression",
        "while_expression",
        "match_expression",
    ],
    name_field: "name",
    params_field: "parameters",
    return_field: Some("return_type"),
    body_field: "body",
    extends_field: None,
    implements_field: None,
    call_target_field: "function",
};

static CPP: LangSyntax = LangSyntax {
    function_kinds: &["function_definition"],
    method_kinds: &["function_definition"],
    class_kinds: &["class_specifier", "struct_specifier"],
    call_kinds: &["call_expression"],
    import_kinds: &["preproc_include"],
    block_kinds: &["if_statement", "for_statement", "while_statement", "try_statement"],
    name_field: "declarator",
    params_field: "parameters",
    return_field: Some("type"),
    body_field: "body",
    extends_field: Some("base_class_clause"),
    implements_field: None,
    call_target_field: "function",
};

static CSHARP: LangSyntax = LangSyntax {
    function_kinds: &[],
    method_kinds: &["method_declaration", "constructor_declaration"],
    class_kinds: &["class_declaration", "interface_declaration", "struct_declaration"],
    call_kinds: &["invocation_expression"],
    import_kinds: &["using_directive"],
    block_kinds: &[
        "if_statement",
        "for_statement",
        "while_statement",
        "try_statement",
        "switch_statement",
    ],
    name_field: "name",
    params_field: "parameter_list",
    return_field: Some("returns"),
    body_field: "body",
    extends_field: Some("bases"),
    implements_field: None,
    call_target_field: "function",
};
