//! `graph-index query <name>`: look up symbols by exact name.

use std::path::Path;

use graph_core::sqlite::SqliteGraphStore;
use graph_core::store::GraphStore;

pub fn run(db_path: &Path, name: &str) -> i32 {
    let store = match SqliteGraphStore::open(db_path.to_str().unwrap_or(".codegraph/graph.db")) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("graph-index query: failed to open store: {e}");
            return 1;
        }
    };

    let symbols = store.get_symbols_by_name(name);
    println!("{}", serde_json::to_string_pretty(&symbols).unwrap_or_default());
    0
}
