//! Incremental index orchestration and derived graph analytics for the
//! code graph indexer.
//!
//! - [`incremental`] — dirty detection, per-file and batch (re)indexing
//! - [`analytics`] — blast radius, fragility, the architecture skeleton,
//!   and the function trace

pub mod analytics;
pub mod incremental;

pub use incremental::{BatchIndexResult, FileHashCheck, FileIndexResult, IndexEngine};
