//! Generic tree-sitter-backed `LanguagePlugin` (spec §4.3).
//!
//! One walker implementation is parametrized by a per-language
//! `LangSyntax` table instead of eight hand-written parsers. AST
//! traversal order gives deterministic unit ordering within a file
//! (spec §4.3 "Determinism").

use crate::domain::{CallTarget, Edge, EdgeKind, Parameter, Unit, UnitKind};
use crate::features::extraction::domain::{normalize, PendingReference};
use crate::features::extraction::infrastructure::syntax_tables::{syntax_for, LangSyntax};
use crate::features::extraction::ports::{LanguagePlugin, WalkOutput};
use crate::shared::models::{normalized_hash, CodegraphError, Result};
use crate::shared::ports::Language;
use tree_sitter::{Node, Parser, Tree};

pub struct TreeSitterPlugin {
    language: Language,
    min_block_lines: u32,
}

impl TreeSitterPlugin {
    pub fn new(language: Language, min_block_lines: u32) -> Self {
        Self {
            language,
            min_block_lines,
        }
    }

    fn ts_language(&self) -> tree_sitter::Language {
        match self.language {
            Language::Python => tree_sitter_python::language(),
            Language::TypeScript => tree_sitter_typescript::language_typescript(),
            Language::JavaScript => tree_sitter_javascript::language(),
            Language::Java => tree_sitter_java::language(),
            Language::Go => tree_sitter_go::language(),
            Language::Rust => tree_sitter_rust::language(),
            Language::Cpp => tree_sitter_cpp::language(),
            Language::CSharp => tree_sitter_c_sharp::language(),
        }
    }
}

impl LanguagePlugin for TreeSitterPlugin {
    fn language(&self) -> Language {
        self.language
    }

    fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.ts_language())
            .map_err(|e| CodegraphError::parse(format!("failed to set grammar: {e}")))?;
        parser
            .parse(source, None)
            .ok_or_else(|| CodegraphError::parse("tree-sitter returned no tree"))
    }

    fn walk(&self, tree: &Tree, source: &str, file_path: &str) -> WalkOutput {
        let syntax = syntax_for(self.language);
        let mut ctx = WalkCtx {
            syntax,
            language: self.language,
            source,
            file_path,
            min_block_lines: self.min_block_lines,
            out: WalkOutput::default(),
        };
        ctx.walk(tree.root_node(), None, None);
        ctx.out
    }
}

struct WalkCtx<'a> {
    syntax: &'static LangSyntax,
    language: Language,
    source: &'a str,
    file_path: &'a str,
    min_block_lines: u32,
    out: WalkOutput,
}

impl<'a> WalkCtx<'a> {
    fn walk(&mut self, node: Node, qualified_prefix: Option<&str>, parent_class: Option<&str>) {
        let kind = node.kind();

        if self.syntax.class_kinds.contains(&kind) {
            self.handle_class(node, qualified_prefix);
            return;
        }

        let is_method = parent_class.is_some()
            && (self.syntax.method_kinds.contains(&kind) || self.syntax.function_kinds.contains(&kind));
        let is_function = self.syntax.function_kinds.contains(&kind) && parent_class.is_none();

        if is_method || is_function {
            self.handle_function(node, qualified_prefix, parent_class, is_method);
            return;
        }

        if self.syntax.call_kinds.contains(&kind) {
            // Calls are collected from inside function/method bodies via
            // `collect_calls`, not at arbitrary tree positions, so a
            // bare top-level call expression (rare) is simply ignored
            // here and its children are still walked below.
        }

        if self.syntax.import_kinds.contains(&kind) {
            if let Some(text) = node.utf8_text(self.source.as_bytes()).ok() {
                self.out.imports.push(text.trim().to_string());
            }
        }

        if self.syntax.block_kinds.contains(&kind) {
            self.maybe_emit_block(node, qualified_prefix, parent_class);
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, qualified_prefix, parent_class);
        }
    }

    fn handle_class(&mut self, node: Node, qualified_prefix: Option<&str>) {
        let name = field_or_first_identifier(node, self.syntax.name_field, self.source)
            .unwrap_or_else(|| "<anonymous>".to_string());
        let qualified_name = qualify(qualified_prefix, &name);
        let span = node_span(node);
        let raw_text = node_text(node, self.source);
        let normalized = normalize(&raw_text, self.language);
        let hash = normalized_hash(&normalized);

        let mut unit = Unit::new(
            self.file_path,
            UnitKind::Class,
            name.clone(),
            qualified_name.clone(),
            span.0,
            span.1,
            self.language,
            raw_text,
            hash,
        );
        unit.complexity = 1;

        for base in self.extract_reference_names(node, self.syntax.extends_field) {
            self.out
                .pending
                .push(PendingReference::new(unit.unit_id.clone(), base, EdgeKind::Extends));
        }
        for iface in self.extract_reference_names(node, self.syntax.implements_field) {
            self.out
                .pending
                .push(PendingReference::new(unit.unit_id.clone(), iface, EdgeKind::Implements));
        }

        let class_unit_id = unit.unit_id.clone();
        self.out.units.push(unit);

        if let Some(body) = node.child_by_field_name(self.syntax.body_field) {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                if self.syntax.method_kinds.contains(&child.kind())
                    || self.syntax.function_kinds.contains(&child.kind())
                {
                    let method_id_before = self.out.units.len();
                    self.handle_function(child, Some(&qualified_name), Some(&name), true);
                    if let Some(method_unit) = self.out.units.get(method_id_before) {
                        self.out.edges.push(Edge::new(
                            class_unit_id.clone(),
                            method_unit.unit_id.clone(),
                            EdgeKind::Contains,
                        ));
                    }
                } else {
                    self.walk(child, Some(&qualified_name), Some(&name));
                }
            }
        }
    }

    fn handle_function(
        &mut self,
        node: Node,
        qualified_prefix: Option<&str>,
        parent_class: Option<&str>,
        is_method: bool,
    ) {
        let name = field_or_first_identifier(node, self.syntax.name_field, self.source)
            .unwrap_or_else(|| "<anonymous>".to_string());
        let qualified_name = qualify(qualified_prefix, &name);
        let span = node_span(node);
        let raw_text = node_text(node, self.source);
        let normalized = normalize(&raw_text, self.language);
        let hash = normalized_hash(&normalized);

        let mut unit = Unit::new(
            self.file_path,
            if is_method { UnitKind::Method } else { UnitKind::Function },
            name,
            qualified_name,
            span.0,
            span.1,
            self.language,
            raw_text,
            hash,
        );
        unit.parent_class = parent_class.map(str::to_string);
        unit.parameters = self.extract_parameters(node);
        unit.signature = Some(signature_text(node, self.source));
        unit.return_type = self
            .syntax
            .return_field
            .and_then(|f| node.child_by_field_name(f))
            .map(|n| n.utf8_text(self.source.as_bytes()).unwrap_or_default().to_string());
        unit.complexity = estimate_complexity(node);

        let calls = self.collect_calls(node);
        for name in &calls {
            self.out.pending.push(PendingReference::new(
                unit.unit_id.clone(),
                name.clone(),
                EdgeKind::Calls,
            ));
        }
        unit.calls_to = calls
            .into_iter()
            .map(|name| CallTarget {
                name,
                dst_unit_id: None,
                unresolved: true,
            })
            .collect();

        self.out.units.push(unit);
    }

    /// Emit a `Block` unit for a control-flow node, unless it is too
    /// short (spec §4.3 "at least MIN_BLOCK_LINES (default 5)").
    fn maybe_emit_block(&mut self, node: Node, qualified_prefix: Option<&str>, parent_class: Option<&str>) {
        let span = node_span(node);
        let line_count = span.1.saturating_sub(span.0) + 1;
        if line_count < self.min_block_lines {
            return;
        }
        let label = format!("block@{}", span.0);
        let qualified_name = qualify(qualified_prefix, &label);
        let raw_text = node_text(node, self.source);
        let normalized = normalize(&raw_text, self.language);
        let hash = normalized_hash(&normalized);

        let mut unit = Unit::new(
            self.file_path,
            UnitKind::Block,
            label,
            qualified_name,
            span.0,
            span.1,
            self.language,
            raw_text,
            hash,
        );
        unit.parent_class = parent_class.map(str::to_string);
        self.out.units.push(unit);
    }

    fn extract_parameters(&self, node: Node) -> Vec<Parameter> {
        let Some(params_node) = node.child_by_field_name(self.syntax.params_field) else {
            return Vec::new();
        };
        let mut params = Vec::new();
        let mut cursor = params_node.walk();
        for child in params_node.children(&mut cursor) {
            if matches!(
                child.kind(),
                "identifier" | "parameter" | "required_parameter" | "optional_parameter"
            ) || child.kind().ends_with("_parameter")
            {
                let name = field_or_first_identifier(child, "name", self.source)
                    .or_else(|| child.utf8_text(self.source.as_bytes()).ok().map(str::to_string));
                if let Some(name) = name {
                    let type_hint = child
                        .child_by_field_name("type")
                        .and_then(|n| n.utf8_text(self.source.as_bytes()).ok())
                        .map(str::to_string);
                    params.push(Parameter {
                        name: name.trim().to_string(),
                        type_hint,
                    });
                }
            }
        }
        params
    }

    /// Name-only call targets within a subtree (spec §4.3: "direct
    /// calls by identifier; best-effort, not sound").
    fn collect_calls(&self, node: Node) -> Vec<String> {
        let mut names = Vec::new();
        collect_calls_rec(node, self.syntax, self.source, &mut names);
        names
    }

    fn extract_reference_names(&self, node: Node, field: Option<&'static str>) -> Vec<String> {
        let Some(field) = field else { return Vec::new() };
        let Some(target) = node.child_by_field_name(field) else {
            return Vec::new();
        };
        let mut names = Vec::new();
        collect_identifiers(target, self.source, &mut names);
        names
    }
}

fn collect_calls_rec(node: Node, syntax: &LangSyntax, source: &str, out: &mut Vec<String>) {
    if syntax.call_kinds.contains(&node.kind()) {
        if let Some(target) = node.child_by_field_name(syntax.call_target_field) {
            if let Some(name) = last_identifier_segment(target, source) {
                out.push(name);
            }
        }
    }
    // Don't descend into nested function/class definitions: their own
    // calls belong to that nested unit, not this one.
    if syntax.function_kinds.contains(&node.kind()) || syntax.class_kinds.contains(&node.kind()) {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls_rec(child, syntax, source, out);
    }
}

/// For a call target expression (`obj.method`, `pkg::f`, `f`), return
/// the last identifier-like segment as the callee name.
fn last_identifier_segment(node: Node, source: &str) -> Option<String> {
    if matches!(
        node.kind(),
        "identifier" | "property_identifier" | "field_identifier" | "type_identifier"
    ) {
        return node.utf8_text(source.as_bytes()).ok().map(str::to_string);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .rev()
        .find_map(|c| last_identifier_segment(c, source))
}

fn collect_identifiers(node: Node, source: &str, out: &mut Vec<String>) {
    if matches!(node.kind(), "identifier" | "type_identifier" | "scoped_identifier") {
        if let Ok(text) = node.utf8_text(source.as_bytes()) {
            out.push(text.to_string());
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_identifiers(child, source, out);
    }
}

/// Look up `field`, falling back to the first identifier-like token in
/// the subtree — handles grammars (e.g. C++'s nested `declarator`)
/// where the "name" isn't a direct field.
fn field_or_first_identifier(node: Node, field: &str, source: &str) -> Option<String> {
    if let Some(named) = node.child_by_field_name(field) {
        if let Some(ident) = first_identifier(named, source) {
            return Some(ident);
        }
    }
    first_identifier(node, source)
}

fn first_identifier(node: Node, source: &str) -> Option<String> {
    if matches!(
        node.kind(),
        "identifier" | "type_identifier" | "property_identifier" | "field_identifier"
    ) {
        return node.utf8_text(source.as_bytes()).ok().map(str::to_string);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_identifier(child, source) {
            return Some(found);
        }
    }
    None
}

fn node_span(node: Node) -> (u32, u32) {
    (
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    )
}

fn node_text(node: Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or_default().to_string()
}

fn qualify(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}.{name}"),
        _ => name.to_string(),
    }
}

fn signature_text(node: Node, source: &str) -> String {
    let text = node_text(node, source);
    text.lines().next().unwrap_or_default().trim().to_string()
}

/// Implementation-defined complexity (spec §9 Open Questions: "not in
/// scope for correctness invariants"). Counts branch-like descendant
/// nodes as a cheap McCabe-ish proxy.
fn estimate_complexity(node: Node) -> u32 {
    let mut count = 1u32;
    let mut cursor = node.walk();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if matches!(
            n.kind(),
            "if_statement"
                | "if_expression"
                | "for_statement"
                | "for_expression"
                | "while_statement"
                | "while_expression"
                | "case_clause"
                | "match_arm"
                | "catch_clause"
                | "conditional_expression"
        ) {
            count += 1;
        }
        cursor = n.walk();
        for child in n.children(&mut cursor) {
            stack.push(child);
        }
    }
    count
}
