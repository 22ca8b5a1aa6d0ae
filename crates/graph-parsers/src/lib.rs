//! Tree-sitter driven parsing, symbol extraction, and batch edge resolution
//! for the code graph indexer.
//!
//! - [`facade`] — grammar loading and tree production
//! - [`extractor`] — the scope-stack symbol/import/call visitor
//! - [`resolver`] — the three-strategy batch edge-resolution ladder

pub mod extractor;
pub mod facade;
pub mod resolver;
