//! Incremental Index Controller (spec.md §4.5): content-hash dirty
//! detection plus per-file and batch delete-then-insert orchestration.
//!
//! Grounded on `keel-enforce/src/engine.rs`'s orchestrator shape — a single
//! struct owning the store and driving it through a fixed sequence of
//! store calls, rather than free functions threading the store through
//! every call site.

use graph_core::hash::compute_content_hash;
use graph_core::store::GraphStore;
use graph_core::time::now_iso8601;
use graph_core::types::{EdgeKind, GraphError, IndexedFile, Language};
use graph_parsers::{extractor, facade::ParserFacade, resolver};

/// Outcome of indexing a single file.
#[derive(Debug, Clone, Copy)]
pub struct FileIndexResult {
    pub symbols_inserted: usize,
    pub edges_inserted: usize,
}

/// Outcome of a batch index (spec.md §6's `parse-batch-complete`).
#[derive(Debug, Clone, Copy)]
pub struct BatchIndexResult {
    pub total_symbols: usize,
    pub total_edges: usize,
    pub files_processed: usize,
}

/// Result of `check-file-hash` (spec.md §6).
#[derive(Debug, Clone)]
pub struct FileHashCheck {
    pub needs_reindex: bool,
    pub stored_hash: Option<String>,
    pub current_hash: String,
}

/// Owns the store for the worker's lifetime and the global symbol-key→id
/// map required for cross-file edge resolution (spec.md §9, "global
/// mutable map"). The map is a `Vec` rather than a `HashMap` so the
/// resolver's insertion-order tie-break is reproducible; see
/// `graph_parsers::resolver`.
pub struct IndexEngine<S: GraphStore> {
    store: S,
    global: Vec<(String, u64)>,
}

impl<S: GraphStore> IndexEngine<S> {
    pub fn new(store: S) -> Self {
        let mut engine = Self { store, global: Vec::new() };
        engine.reload_global_map();
        engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Rebuilds the global map from whatever is already persisted, so a
    /// worker restarting against an existing database resumes with a
    /// correct map rather than an empty one.
    fn reload_global_map(&mut self) {
        self.global.clear();
        for path in self.store.all_file_paths() {
            for symbol in self.store.get_symbols_in_file(&path) {
                self.global.push((symbol.own_key(), symbol.id));
            }
        }
    }

    pub fn check_file_hash(&self, path: &str, content: &[u8]) -> FileHashCheck {
        let current_hash = compute_content_hash(content);
        let stored_hash = self.store.get_file_hash(path);
        let needs_reindex = stored_hash.as_deref() != Some(current_hash.as_str());
        FileHashCheck { needs_reindex, stored_hash, current_hash }
    }

    fn remove_file_from_global(&mut self, path: &str) {
        let prefix = format!("{path}:");
        self.global.retain(|(key, _)| !key.starts_with(prefix.as_str()));
    }

    /// Per-file update (spec.md §4.5): delete, re-extract, insert symbols,
    /// then resolve edges against the current global map — which still
    /// carries every other file's entries, so cross-file calls resolve on
    /// a single-file `parse` request exactly as they would in a batch.
    pub fn index_file(
        &mut self,
        path: &str,
        content: &[u8],
        language: Language,
    ) -> Result<FileIndexResult, GraphError> {
        self.store.delete_symbols_by_file(path)?;
        self.remove_file_from_global(path);

        let mut facade = ParserFacade::new();
        let tree = facade
            .parse(content, language)
            .map_err(|e| GraphError::Internal(e.to_string()))?;
        let output = extractor::extract(&tree, content, path, language);

        let ids = self.store.insert_symbols(&output.symbols)?;
        for (i, symbol) in output.symbols.iter().enumerate() {
            self.global.push((symbol.own_key(), ids[i]));
        }

        let call_edges = resolver::resolve_calls(&output.calls, &self.global);
        let import_edges = resolver::resolve_imports(&output.imports, &self.global);
        self.store.insert_edge_batch(&call_edges, EdgeKind::Call)?;
        self.store.insert_edge_batch(&import_edges, EdgeKind::Import)?;

        let content_hash = compute_content_hash(content);
        self.store.set_file_hash(&IndexedFile {
            file_path: path.to_string(),
            content_hash,
            last_indexed_at: now_iso8601(),
        })?;
        self.store.set_meta("last_index_time", &now_iso8601())?;

        Ok(FileIndexResult {
            symbols_inserted: ids.len(),
            edges_inserted: call_edges.len() + import_edges.len(),
        })
    }

    /// Batch update (spec.md §4.5, §4.4): first pass deletes-then-inserts
    /// symbols file by file, updating the global map as it goes; second
    /// pass resolves calls and imports from the accumulated lists once
    /// every file's symbols are committed. Wrapped in bulk-ingest mode
    /// (`preIndexCleanup`/`postIndexOptimization`), paired even on the
    /// failure path per spec.md §4.4.
    ///
    /// A single file failing to parse does not fail the batch (spec.md
    /// §7): it is skipped and still counted in `files_processed`.
    pub fn index_batch(
        &mut self,
        files: &[(String, Vec<u8>, Language)],
    ) -> Result<BatchIndexResult, GraphError> {
        self.store.pre_index_cleanup()?;
        let result = self.index_batch_inner(files);
        self.store.post_index_optimization()?;
        result
    }

    fn index_batch_inner(
        &mut self,
        files: &[(String, Vec<u8>, Language)],
    ) -> Result<BatchIndexResult, GraphError> {
        let mut all_calls = Vec::new();
        let mut all_imports = Vec::new();
        let mut files_processed = 0usize;
        let mut total_symbols = 0usize;

        for (path, content, language) in files {
            self.store.delete_symbols_by_file(path)?;
            self.remove_file_from_global(path);
            files_processed += 1;

            let mut facade = ParserFacade::new();
            let Ok(tree) = facade.parse(content, *language) else {
                continue;
            };
            let output = extractor::extract(&tree, content, path, *language);

            let ids = self.store.insert_symbols(&output.symbols)?;
            for (i, symbol) in output.symbols.iter().enumerate() {
                self.global.push((symbol.own_key(), ids[i]));
            }
            total_symbols += ids.len();
            all_calls.extend(output.calls);
            all_imports.extend(output.imports);

            let content_hash = compute_content_hash(content);
            self.store.set_file_hash(&IndexedFile {
                file_path: path.clone(),
                content_hash,
                last_indexed_at: now_iso8601(),
            })?;
        }

        let call_edges = resolver::resolve_calls(&all_calls, &self.global);
        let import_edges = resolver::resolve_imports(&all_imports, &self.global);
        self.store.insert_edge_batch(&call_edges, EdgeKind::Call)?;
        self.store.insert_edge_batch(&import_edges, EdgeKind::Import)?;
        self.store.set_meta("last_index_time", &now_iso8601())?;

        Ok(BatchIndexResult {
            total_symbols,
            total_edges: call_edges.len() + import_edges.len(),
            files_processed,
        })
    }
}

#[cfg(test)]
#[path = "incremental_tests.rs"]
mod tests;
