//! Concrete `LanguagePlugin` adapters and the non-parsing fallback.

pub mod block_extractor;
pub mod syntax_tables;
pub mod tree_sitter_walker;

pub use block_extractor::extract_blocks;
pub use tree_sitter_walker::TreeSitterPlugin;
