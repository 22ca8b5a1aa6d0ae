//! `graph-index serve`: hand off to the worker's request loop. Grounded
//! on `keel-cli/src/commands/serve.rs`'s "open the store, run the
//! server, map its outcome to an exit code" shape — this interface has
//! no HTTP/watch modes (spec.md §1 routes those to external
//! collaborators), so no tokio runtime is needed.

use std::path::Path;

pub fn run(root: &Path, db_path: &Path) -> i32 {
    let worker =
        match graph_worker::GraphWorker::open(db_path.to_str().unwrap_or(".codegraph/graph.db"), root.to_path_buf())
        {
            Ok(w) => w,
            Err(e) => {
                eprintln!("graph-index serve: failed to open store: {e}");
                return 1;
            }
        };

    match worker.run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("graph-index serve: {e}");
            1
        }
    }
}
