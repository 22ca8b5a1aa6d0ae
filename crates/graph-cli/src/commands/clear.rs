//! `graph-index clear`: drop the entire index.

use std::path::Path;

use graph_core::sqlite::SqliteGraphStore;
use graph_core::store::GraphStore;

pub fn run(db_path: &Path) -> i32 {
    let mut store = match SqliteGraphStore::open(db_path.to_str().unwrap_or(".codegraph/graph.db")) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("graph-index clear: failed to open store: {e}");
            return 1;
        }
    };

    match store.clear() {
        Ok(()) => {
            println!("graph-index clear: index dropped");
            0
        }
        Err(e) => {
            eprintln!("graph-index clear: {e}");
            1
        }
    }
}
