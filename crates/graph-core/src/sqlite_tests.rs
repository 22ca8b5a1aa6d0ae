use super::*;
use crate::store::GraphStore;
use crate::types::{Range, Symbol, SymbolKind};

fn sym(name: &str, file: &str, start_line: u32, complexity: u32) -> Symbol {
    Symbol {
        id: 0,
        name: name.to_string(),
        kind: SymbolKind::Function,
        file_path: file.to_string(),
        range: Range { start_line, start_column: 0, end_line: start_line + 5, end_column: 0 },
        complexity,
    }
}

#[test]
fn test_insert_and_get_symbol() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    let ids = store.insert_symbols(&[sym("add", "a.ts", 1, 1)]).unwrap();
    let retrieved = store.get_symbol(ids[0]).unwrap();
    assert_eq!(retrieved.name, "add");
    assert_eq!(retrieved.complexity, 1);
}

#[test]
fn test_reinsert_same_key_is_idempotent_not_duplicated() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    let ids_a = store.insert_symbols(&[sym("add", "a.ts", 1, 1)]).unwrap();
    let ids_b = store.insert_symbols(&[sym("add", "a.ts", 1, 2)]).unwrap();
    assert_eq!(ids_a, ids_b);
    let retrieved = store.get_symbol(ids_a[0]).unwrap();
    assert_eq!(retrieved.complexity, 2);
    assert_eq!(store.get_symbols_in_file("a.ts").len(), 1);
}

#[test]
fn test_delete_symbols_by_file_cascades_edges() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    let ids = store
        .insert_symbols(&[sym("caller", "a.ts", 1, 1), sym("callee", "b.ts", 1, 1)])
        .unwrap();
    store
        .insert_edges(&[Edge { id: 0, source_id: ids[0], target_id: ids[1], kind: EdgeKind::Call, reason: None }])
        .unwrap();
    assert_eq!(store.get_edges(ids[1], EdgeDirection::Incoming).len(), 1);

    store.delete_symbols_by_file("a.ts").unwrap();
    assert!(store.get_symbol(ids[0]).is_none());
    assert_eq!(store.get_edges(ids[1], EdgeDirection::Incoming).len(), 0);
}

#[test]
fn test_self_edge_skipped_by_insert_edge_batch() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    let ids = store.insert_symbols(&[sym("recurse", "a.ts", 1, 1)]).unwrap();
    store.insert_edge_batch(&[(ids[0], ids[0])], EdgeKind::Call).unwrap();
    assert_eq!(store.get_edges(ids[0], EdgeDirection::Both).len(), 0);
}

#[test]
fn test_insert_edge_batch_dedupes() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    let ids = store.insert_symbols(&[sym("a", "x.ts", 1, 1), sym("b", "x.ts", 2, 1)]).unwrap();
    store.insert_edge_batch(&[(ids[0], ids[1]), (ids[0], ids[1])], EdgeKind::Call).unwrap();
    assert_eq!(store.get_edges(ids[0], EdgeDirection::Outgoing).len(), 1);
}

#[test]
fn test_file_hash_roundtrip() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    assert!(store.get_file_hash("a.ts").is_none());
    store
        .set_file_hash(&IndexedFile {
            file_path: "a.ts".to_string(),
            content_hash: "deadbeef".to_string(),
            last_indexed_at: "2026-01-01T00:00:00Z".to_string(),
        })
        .unwrap();
    assert_eq!(store.get_file_hash("a.ts").unwrap(), "deadbeef");
}

#[test]
fn test_ai_cache_roundtrip() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    assert!(store.get_ai_cache("k1").is_none());
    store.set_ai_cache("k1", "response body").unwrap();
    assert_eq!(store.get_ai_cache("k1").unwrap(), "response body");
}

#[test]
fn test_enrichment_roundtrip() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    let ids = store.insert_symbols(&[sym("f", "a.ts", 1, 3)]).unwrap();
    store
        .set_enrichment(
            ids[0],
            &SymbolEnrichment {
                domain: Some("Data Layer".to_string()),
                fragility: Some(9.0),
                ..Default::default()
            },
        )
        .unwrap();
    let e = store.get_enrichment(ids[0]).unwrap();
    assert_eq!(e.domain.as_deref(), Some("Data Layer"));
    assert_eq!(e.fragility, Some(9.0));
}

#[test]
fn test_schema_version() {
    let store = SqliteGraphStore::in_memory().unwrap();
    assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
}

#[test]
fn test_clear_wipes_everything_but_schema_version() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    store.insert_symbols(&[sym("f", "a.ts", 1, 1)]).unwrap();
    store.set_meta("last_index_time", "now").unwrap();
    store.clear().unwrap();
    assert_eq!(store.stats(), (0, 0, 0));
    assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    assert!(store.get_meta("last_index_time").is_none());
}

#[test]
fn test_workspace_root_heuristic() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    for path in ["src/db/a.ts", "src/db/b.ts"] {
        store
            .set_file_hash(&IndexedFile {
                file_path: path.to_string(),
                content_hash: "h".to_string(),
                last_indexed_at: "now".to_string(),
            })
            .unwrap();
    }
    assert_eq!(store.workspace_root(), "src/db");
}

#[test]
fn test_file_edge_counts_cross_file_imports_only() {
    let mut store = SqliteGraphStore::in_memory().unwrap();
    let ids = store
        .insert_symbols(&[sym("importer", "a.ts", 1, 1), sym("target", "b.ts", 1, 1)])
        .unwrap();
    store
        .insert_edges(&[Edge { id: 0, source_id: ids[0], target_id: ids[1], kind: EdgeKind::Import, reason: None }])
        .unwrap();
    let counts = store.file_edge_counts("a.ts");
    assert_eq!(counts, vec![("b.ts".to_string(), 1)]);
}
