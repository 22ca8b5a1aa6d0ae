//! Bulk-ingest pragma pairing (spec.md §4.4).
//!
//! `pre_index_cleanup` drops secondary indexes and relaxes durability for
//! maximal write throughput during a full index; `post_index_optimization`
//! restores both and re-analyzes. Pairing is mandatory — the caller in
//! `graph-engine::incremental` invokes `post_index_optimization` even when
//! the ingest pass itself failed. Grounded loosely on this codebase's own
//! `PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;` convention,
//! extended with the index-drop/recreate and page-cache tuning spec.md
//! requires.

use crate::sqlite::SqliteGraphStore;
use crate::types::GraphError;

const SECONDARY_INDEXES: &[(&str, &str)] = &[
    ("idx_symbols_name", "CREATE INDEX idx_symbols_name ON symbols(name)"),
    ("idx_symbols_file", "CREATE INDEX idx_symbols_file ON symbols(file_path)"),
    ("idx_symbols_kind", "CREATE INDEX idx_symbols_kind ON symbols(kind)"),
    ("idx_symbols_domain", "CREATE INDEX idx_symbols_domain ON symbols(domain)"),
    ("idx_edges_source", "CREATE INDEX idx_edges_source ON edges(source_id)"),
    ("idx_edges_target", "CREATE INDEX idx_edges_target ON edges(target_id)"),
    ("idx_edges_kind", "CREATE INDEX idx_edges_kind ON edges(kind)"),
];

pub(crate) fn pre_index_cleanup(store: &mut SqliteGraphStore) -> Result<(), GraphError> {
    for (name, _) in SECONDARY_INDEXES {
        store.conn.execute(&format!("DROP INDEX IF EXISTS {name}"), [])?;
    }
    store.conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         PRAGMA synchronous = OFF;
         PRAGMA journal_mode = MEMORY;
         PRAGMA temp_store = MEMORY;
         PRAGMA cache_size = -65536;",
    )?;
    Ok(())
}

pub(crate) fn post_index_optimization(store: &mut SqliteGraphStore) -> Result<(), GraphError> {
    for (_, ddl) in SECONDARY_INDEXES {
        store.conn.execute(&format!("{ddl}"), [])?;
    }
    store.conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA synchronous = NORMAL;
         PRAGMA journal_mode = WAL;
         ANALYZE;",
    )?;
    Ok(())
}
