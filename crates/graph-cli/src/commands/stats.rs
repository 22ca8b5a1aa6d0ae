//! `graph-index stats`: print symbol/edge/file counts and the last
//! index time. Grounded on `keel-cli/src/commands/stats.rs`'s shape,
//! rewritten against the new `GraphStore::stats()`/`get_meta` methods
//! rather than the teacher's per-module node walk.

use std::path::Path;

use graph_core::sqlite::SqliteGraphStore;
use graph_core::store::GraphStore;

pub fn run(db_path: &Path) -> i32 {
    let store = match SqliteGraphStore::open(db_path.to_str().unwrap_or(".codegraph/graph.db")) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("graph-index stats: failed to open store: {e}");
            return 1;
        }
    };

    let (symbols, edges, files) = store.stats();
    let last_index_time = store.get_meta("last_index_time");

    println!(
        "{}",
        serde_json::json!({
            "symbols": symbols,
            "edges": edges,
            "files": files,
            "lastIndexTime": last_index_time,
        })
    );

    0
}
