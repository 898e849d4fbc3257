//! Language abstraction (spec §4.3, REDESIGN FLAGS §9).
//!
//! "Polymorphism over languages is expressed as a tagged variant
//! `Language { Ts, Js, Py, Java, Go, Rust, Cpp, CSharp }` plus a
//! dispatch table" — the dispatch table lives in
//! `features::parsing::infrastructure::plugins`.

use serde::{Deserialize, Serialize};

/// The eight languages the extractor is polymorphic over (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    Go,
    Rust,
    Cpp,
    CSharp,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::Go,
        Language::Rust,
        Language::Cpp,
        Language::CSharp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Cpp => "c++",
            Language::CSharp => "c#",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript => &["ts", "tsx"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::Python => &["py", "pyi"],
            Language::Java => &["java"],
            Language::Go => &["go"],
            Language::Rust => &["rs"],
            Language::Cpp => &["cc", "cpp", "cxx", "hpp", "hh", "h"],
            Language::CSharp => &["cs"],
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    pub fn from_file_path(path: &str) -> Option<Self> {
        path.rsplit('.').next().and_then(Self::from_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_extension_covers_all_eight_languages() {
        assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
        assert_eq!(Language::from_extension("cs"), Some(Language::CSharp));
        assert_eq!(Language::from_extension("cpp"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("go"), Some(Language::Go));
        assert_eq!(Language::from_extension("java"), Some(Language::Java));
        assert_eq!(Language::from_extension("js"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("xyz"), None);
    }

    #[test]
    fn from_file_path_uses_last_extension() {
        assert_eq!(
            Language::from_file_path("src/main.rs"),
            Some(Language::Rust)
        );
        assert_eq!(Language::from_file_path("a.test.ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_file_path("README"), None);
    }
}
