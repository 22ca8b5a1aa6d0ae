use graph_core::sqlite::SqliteGraphStore;
use graph_core::store::GraphStore;
use graph_core::types::Language;

use super::IndexEngine;

const SCENARIO_A: &str = "export function add(a:number,b:number){ return a+b; }\nexport function sum(xs:number[]){ return xs.reduce((s,x)=>add(s,x),0); }\n";

#[test]
fn test_index_file_inserts_scenario_a_symbols_and_one_call_edge() {
    let store = SqliteGraphStore::in_memory().unwrap();
    let mut engine = IndexEngine::new(store);
    let result = engine.index_file("main.ts", SCENARIO_A.as_bytes(), Language::Typescript).unwrap();
    assert_eq!(result.symbols_inserted, 3);
    assert_eq!(result.edges_inserted, 1);
    assert_eq!(engine.store().stats(), (3, 1, 1));
}

#[test]
fn test_check_file_hash_reports_dirty_only_on_change() {
    let store = SqliteGraphStore::in_memory().unwrap();
    let mut engine = IndexEngine::new(store);
    engine.index_file("main.ts", SCENARIO_A.as_bytes(), Language::Typescript).unwrap();

    let unchanged = engine.check_file_hash("main.ts", SCENARIO_A.as_bytes());
    assert!(!unchanged.needs_reindex);

    let changed = engine.check_file_hash("main.ts", b"export function add(a:number,b:number){ return a-b; }\n");
    assert!(changed.needs_reindex);
}

#[test]
fn test_scenario_e_reindex_drops_old_symbols_and_their_edges() {
    let store = SqliteGraphStore::in_memory().unwrap();
    let mut engine = IndexEngine::new(store);
    engine.index_file("main.ts", SCENARIO_A.as_bytes(), Language::Typescript).unwrap();
    let (old_symbols, _, _) = engine.store().stats();
    assert_eq!(old_symbols, 3);

    let v2 = "export function add(a:number,b:number){ return a+b; }\n";
    engine.index_file("main.ts", v2.as_bytes(), Language::Typescript).unwrap();
    let (new_symbols, new_edges, _) = engine.store().stats();
    assert_eq!(new_symbols, 1);
    assert_eq!(new_edges, 0);
}

#[test]
fn test_index_batch_resolves_cross_file_import_bridge_call() {
    let store = SqliteGraphStore::in_memory().unwrap();
    let mut engine = IndexEngine::new(store);
    let files = vec![
        ("lib.ts".to_string(), b"export function hash(s:string){ return s.length; }\n".to_vec(), Language::Typescript),
        (
            "main.ts".to_string(),
            b"import { hash } from './lib';\nexport function go(){ return hash('x'); }\n".to_vec(),
            Language::Typescript,
        ),
    ];
    let result = engine.index_batch(&files).unwrap();
    assert_eq!(result.files_processed, 2);
    assert_eq!(result.total_symbols, 2);
    assert_eq!(result.total_edges, 1);
}

#[test]
fn test_index_batch_skips_unparseable_file_but_still_counts_it() {
    let store = SqliteGraphStore::in_memory().unwrap();
    let mut engine = IndexEngine::new(store);
    let files = vec![("weird.xyz".to_string(), b"???".to_vec(), Language::C)];
    let result = engine.index_batch(&files).unwrap();
    assert_eq!(result.files_processed, 1);
}

#[test]
fn test_reload_global_map_resumes_cross_file_resolution_after_restart() {
    let path = std::env::temp_dir().join(format!(
        "graph-engine-test-{}.sqlite",
        std::process::id()
    ));
    let path_str = path.to_str().unwrap().to_string();
    let _ = std::fs::remove_file(&path);

    {
        let store = SqliteGraphStore::open(&path_str).unwrap();
        let mut engine = IndexEngine::new(store);
        engine
            .index_file("lib.ts", b"export function hash(s:string){ return s.length; }\n", Language::Typescript)
            .unwrap();
    }
    {
        let store = SqliteGraphStore::open(&path_str).unwrap();
        let mut engine = IndexEngine::new(store);
        let result = engine
            .index_file(
                "main.ts",
                b"import { hash } from './lib';\nexport function go(){ return hash('x'); }\n",
                Language::Typescript,
            )
            .unwrap();
        assert_eq!(result.edges_inserted, 1);
    }
    let _ = std::fs::remove_file(&path);
}
