//! `graph-index index`: walk the workspace and batch-index every
//! recognized file. Grounded on `keel-cli/src/commands/compile.rs`'s
//! shape (open the store, run the engine, print a summary), generalized
//! from incremental compile-checking to a full batch index.

use std::path::Path;

use graph_core::sqlite::SqliteGraphStore;
use graph_engine::IndexEngine;

use crate::walker::FileWalker;

pub fn run(root: &Path, db_path: &Path) -> i32 {
    let store = match SqliteGraphStore::open(db_path.to_str().unwrap_or(".codegraph/graph.db")) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("graph-index index: failed to open store: {e}");
            return 1;
        }
    };
    let mut engine = IndexEngine::new(store);

    let entries = FileWalker::new(root).walk();
    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        match std::fs::read(&entry.path) {
            Ok(content) => files.push((entry.path.display().to_string(), content, entry.language)),
            Err(e) => eprintln!("graph-index index: skipping {}: {e}", entry.path.display()),
        }
    }

    match engine.index_batch(&files) {
        Ok(result) => {
            println!(
                "{}",
                serde_json::json!({
                    "filesProcessed": result.files_processed,
                    "totalSymbols": result.total_symbols,
                    "totalEdges": result.total_edges,
                })
            );
            0
        }
        Err(e) => {
            eprintln!("graph-index index: {e}");
            1
        }
    }
}
