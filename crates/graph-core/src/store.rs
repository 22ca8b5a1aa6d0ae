use crate::types::{Edge, EdgeDirection, GraphError, IndexedFile, Symbol, SymbolEnrichment};

/// FROZEN CONTRACT — GraphStore trait.
///
/// The indexer, the analytics engine, and the worker all consume this
/// interface. Do not change its signatures without updating every caller.
pub trait GraphStore {
    /// Look up a symbol by its persisted id.
    fn get_symbol(&self, id: u64) -> Option<Symbol>;

    /// Look up symbols by name (exact match).
    fn get_symbols_by_name(&self, name: &str) -> Vec<Symbol>;

    /// Look up the symbol at a given file and 1-based start line, if any.
    fn get_symbol_at(&self, file_path: &str, start_line: u32) -> Option<Symbol>;

    /// All symbols declared in a file.
    fn get_symbols_in_file(&self, file_path: &str) -> Vec<Symbol>;

    /// All symbols whose enrichment domain matches.
    fn get_symbols_by_domain(&self, domain: &str) -> Vec<Symbol>;

    /// Edges touching a symbol in the given direction.
    fn get_edges(&self, symbol_id: u64, direction: EdgeDirection) -> Vec<Edge>;

    /// Cross-file import edge counts, keyed by neighboring file path.
    fn file_edge_counts(&self, file_path: &str) -> Vec<(String, u32)>;

    /// Cross-domain vs. total edge counts for symbols in `domain`.
    fn domain_edge_counts(&self, domain: &str) -> (u32, u32);

    /// Insert a batch of symbols in a single transaction; returns new ids
    /// in input order.
    fn insert_symbols(&mut self, symbols: &[Symbol]) -> Result<Vec<u64>, GraphError>;

    /// Insert a batch of edges in a single transaction; rows with either
    /// endpoint zero are skipped.
    fn insert_edges(&mut self, edges: &[Edge]) -> Result<(), GraphError>;

    /// Insert `(source_id, target_id)` pairs of the given kind, skipping
    /// self-edges and deduplicating via `INSERT OR IGNORE`.
    fn insert_edge_batch(
        &mut self,
        pairs: &[(u64, u64)],
        kind: crate::types::EdgeKind,
    ) -> Result<(), GraphError>;

    /// Delete all symbols declared in `file_path`; cascades to edges.
    fn delete_symbols_by_file(&mut self, file_path: &str) -> Result<(), GraphError>;

    /// Read the stored content hash for a file, if indexed.
    fn get_file_hash(&self, file_path: &str) -> Option<String>;

    /// Record a file's content hash and indexing timestamp.
    fn set_file_hash(&mut self, file: &IndexedFile) -> Result<(), GraphError>;

    /// Read an enrichment record for a symbol.
    fn get_enrichment(&self, symbol_id: u64) -> Option<SymbolEnrichment>;

    /// Write (replace) an enrichment record for a symbol.
    fn set_enrichment(
        &mut self,
        symbol_id: u64,
        enrichment: &SymbolEnrichment,
    ) -> Result<(), GraphError>;

    /// Read a cached response keyed by the SHA-256 hex of a canonical
    /// request payload.
    fn get_ai_cache(&self, hash: &str) -> Option<String>;

    /// Write a cached response, keyed the same way.
    fn set_ai_cache(&mut self, hash: &str, response: &str) -> Result<(), GraphError>;

    /// Read a `meta` value by key.
    fn get_meta(&self, key: &str) -> Option<String>;

    /// Write a `meta` value.
    fn set_meta(&mut self, key: &str, value: &str) -> Result<(), GraphError>;

    /// Export the whole graph: every symbol and every edge.
    fn export_graph(&self) -> (Vec<Symbol>, Vec<Edge>);

    /// Drop the entire index: symbols, edges, files, meta.
    fn clear(&mut self) -> Result<(), GraphError>;

    /// Total symbol / edge / file counts.
    fn stats(&self) -> (u64, u64, u64);

    /// Longest common path prefix of all indexed file paths, split on the
    /// path separator (spec.md §4.4).
    fn workspace_root(&self) -> String;

    /// All distinct indexed file paths.
    fn all_file_paths(&self) -> Vec<String>;

    /// Enter bulk-ingest mode: drop secondary indexes, relax durability.
    /// Must always be paired with `post_index_optimization`, even on the
    /// failure path (spec.md §4.4).
    fn pre_index_cleanup(&mut self) -> Result<(), GraphError>;

    /// Leave bulk-ingest mode: restore durability, recreate indexes,
    /// `ANALYZE`.
    fn post_index_optimization(&mut self) -> Result<(), GraphError>;
}
