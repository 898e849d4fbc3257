//! Unit Extractor use-case (C3, spec §4.3).

use crate::config::Config;
use crate::domain::{Edge, EdgeKind, Unit, UnitKind};
use crate::features::extraction::domain::PendingReference;
use crate::features::extraction::infrastructure::{extract_blocks, TreeSitterPlugin};
use crate::features::extraction::ports::LanguagePlugin;
use crate::shared::ports::Language;
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use tracing::warn;

/// Directory fragments that mark a path as test/spec/build-output/
/// vendored, excluded from extraction per configuration (spec §4.3).
const EXCLUDED_PATH_FRAGMENTS: &[&str] = &[
    "/test/", "/tests/", "/__tests__/", "/spec/", "/vendor/", "/dist/", "/build/", "/node_modules/",
    "/target/",
];

pub struct ExtractionOutcome {
    pub units: Vec<Unit>,
    pub edges: Vec<Edge>,
    pub pending: Vec<PendingReference>,
    pub parse_failed: bool,
}

/// Unit Extractor (C3): dispatches to the registered `LanguagePlugin`
/// for `language`, falling back to the line-window block extractor on
/// parse failure or an unregistered language (spec §4.3 Failure).
pub struct Extractor {
    plugins: HashMap<Language, Box<dyn LanguagePlugin>>,
    min_block_lines: u32,
}

impl Extractor {
    pub fn new(config: &Config) -> Self {
        let mut plugins: HashMap<Language, Box<dyn LanguagePlugin>> = HashMap::new();
        for &language in &config.languages {
            plugins.insert(
                language,
                Box::new(TreeSitterPlugin::new(language, config.min_block_lines)) as Box<dyn LanguagePlugin>,
            );
        }
        Self {
            plugins,
            min_block_lines: config.min_block_lines,
        }
    }

    pub fn extract(&self, file_path: &str, content: &str, language: Option<Language>) -> ExtractionOutcome {
        if is_excluded_path(file_path) {
            return ExtractionOutcome {
                units: Vec::new(),
                edges: Vec::new(),
                pending: Vec::new(),
                parse_failed: false,
            };
        }

        let Some(language) = language else {
            return ExtractionOutcome {
                units: Vec::new(),
                edges: Vec::new(),
                pending: Vec::new(),
                parse_failed: false,
            };
        };

        let Some(plugin) = self.plugins.get(&language) else {
            let units = extract_blocks(file_path, content, language, self.min_block_lines);
            return ExtractionOutcome {
                units,
                edges: Vec::new(),
                pending: Vec::new(),
                parse_failed: false,
            };
        };

        match plugin.parse(content) {
            Ok(tree) => {
                let out = plugin.walk(&tree, content, file_path);
                ExtractionOutcome {
                    units: out.units,
                    edges: out.edges,
                    pending: out.pending,
                    parse_failed: false,
                }
            }
            Err(err) => {
                warn!(file = file_path, error = %err, "extractor: parse failed, falling back to block extractor");
                let units = extract_blocks(file_path, content, language, self.min_block_lines);
                ExtractionOutcome {
                    units,
                    edges: Vec::new(),
                    pending: Vec::new(),
                    parse_failed: true,
                }
            }
        }
    }
}

fn is_excluded_path(path: &str) -> bool {
    let normalized = format!("/{}", path.replace('\\', "/"));
    EXCLUDED_PATH_FRAGMENTS.iter().any(|frag| normalized.contains(frag))
}

/// Second-pass name resolution (spec §4.3 "Edge extraction"): resolve
/// `PendingReference`s against the full project unit table. Ambiguous
/// matches (more than one candidate) resolve to the first match and
/// are marked `unresolved: true`, matching the REDESIGN FLAGS §9
/// guidance to label rather than silently collapse uncertain edges.
/// References with no candidate at all are dropped (spec invariant 4:
/// an edge requires both units to exist).
pub fn resolve_references(units: &[Unit], pending: &[PendingReference]) -> Vec<Edge> {
    let mut by_name: FxHashMap<&str, Vec<&Unit>> = FxHashMap::default();
    for unit in units {
        by_name.entry(unit.name.as_str()).or_default().push(unit);
        by_name.entry(unit.qualified_name.as_str()).or_default().push(unit);
    }

    let mut edges = Vec::with_capacity(pending.len());
    for reference in pending {
        let candidates: Vec<&&Unit> = by_name
            .get(reference.name.as_str())
            .into_iter()
            .flatten()
            .filter(|u| kind_matches(reference.kind, u.kind))
            .filter(|u| u.unit_id != reference.src_unit_id)
            .collect();

        let Some(first) = candidates.first() else {
            continue;
        };
        let ambiguous = candidates.len() > 1;
        let mut edge = Edge::new(reference.src_unit_id.clone(), first.unit_id.clone(), reference.kind);
        if ambiguous {
            edge = edge.unresolved();
        }
        edges.push(edge);
    }
    edges
}

fn kind_matches(edge_kind: EdgeKind, unit_kind: UnitKind) -> bool {
    match edge_kind {
        EdgeKind::Extends | EdgeKind::Implements => matches!(unit_kind, UnitKind::Class),
        EdgeKind::Calls => matches!(unit_kind, UnitKind::Function | UnitKind::Method),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ports::Language;

    #[test]
    fn unsupported_extension_yields_no_units() {
        let extractor = Extractor::new(&Config::default());
        let out = extractor.extract("a.py", "x = 1", None);
        assert!(out.units.is_empty());
        assert!(!out.parse_failed);
    }

    #[test]
    fn vendored_paths_are_skipped() {
        let extractor = Extractor::new(&Config::default());
        let out = extractor.extract("vendor/lib.py", "def f(): pass\n".repeat(3).as_str(), Some(Language::Python));
        assert!(out.units.is_empty());
    }

    #[test]
    fn python_function_is_extracted() {
        let extractor = Extractor::new(&Config::default());
        let src = "def greet(name):\n    return 'hi ' + name\n";
        let out = extractor.extract("a.py", src, Some(Language::Python));
        assert_eq!(out.units.len(), 1);
        assert_eq!(out.units[0].kind, UnitKind::Function);
        assert_eq!(out.units[0].name, "greet");
    }

    #[test]
    fn python_class_with_method_contains_edge() {
        let extractor = Extractor::new(&Config::default());
        let src = "class Greeter:\n    def greet(self, name):\n        return name\n";
        let out = extractor.extract("a.py", src, Some(Language::Python));
        let class = out.units.iter().find(|u| u.kind == UnitKind::Class).unwrap();
        let method = out.units.iter().find(|u| u.kind == UnitKind::Method).unwrap();
        assert_eq!(method.parent_class.as_deref(), Some("Greeter"));
        assert!(out
            .edges
            .iter()
            .any(|e| e.kind == EdgeKind::Contains && e.src_unit_id == class.unit_id && e.dst_unit_id == method.unit_id));
    }

    #[test]
    fn resolve_references_links_calls_within_project() {
        let extractor = Extractor::new(&Config::default());
        let src = "def helper():\n    return 1\n\ndef caller():\n    return helper()\n";
        let out = extractor.extract("a.py", src, Some(Language::Python));
        let edges = resolve_references(&out.units, &out.pending);
        let caller = out.units.iter().find(|u| u.name == "caller").unwrap();
        let helper = out.units.iter().find(|u| u.name == "helper").unwrap();
        assert!(edges
            .iter()
            .any(|e| e.kind == EdgeKind::Calls && e.src_unit_id == caller.unit_id && e.dst_unit_id == helper.unit_id));
    }

    #[test]
    fn unresolved_calls_are_dropped_not_fabricated() {
        let extractor = Extractor::new(&Config::default());
        let src = "def caller():\n    return nowhere_defined()\n";
        let out = extractor.extract("a.py", src, Some(Language::Python));
        let edges = resolve_references(&out.units, &out.pending);
        assert!(edges.iter().all(|e| e.kind != EdgeKind::Calls));
    }
}
