//! Worker entry & message bus (spec.md §4.7): a stdin/stdout request loop
//! that owns the graph store exclusively, enforces a memory ceiling, and
//! runs off the UI thread.
//!
//! - [`protocol`] — request/response envelopes
//! - [`dispatch`] — the command table
//! - [`stdio`] — the run loop
//! - [`memory`] — the memory ceiling watchdog

pub mod dispatch;
pub mod memory;
pub mod protocol;
pub mod stdio;

use std::path::PathBuf;

use graph_core::config::GraphConfig;
use graph_core::sqlite::SqliteGraphStore;
use graph_core::types::GraphError;

/// Owns the database path and root directory a worker process serves
/// from. Mirrors `KeelServer`'s role as the thing a CLI `serve` command
/// constructs before handing off to the run loop.
pub struct GraphWorker {
    store: SqliteGraphStore,
    memory_ceiling_mb: u32,
    pub root_dir: PathBuf,
}

impl GraphWorker {
    /// Opens a worker against an existing (or freshly created) database
    /// file, loading `.codegraph/config.json` for the memory ceiling.
    pub fn open(db_path: &str, root_dir: PathBuf) -> Result<Self, GraphError> {
        let store = SqliteGraphStore::open(db_path)?;
        let config = GraphConfig::load(&root_dir);
        Ok(Self { store, memory_ceiling_mb: config.memory_ceiling_mb, root_dir })
    }

    /// Opens a worker with an in-memory store (testing).
    pub fn in_memory(root_dir: PathBuf) -> Result<Self, GraphError> {
        let store = SqliteGraphStore::in_memory()?;
        Ok(Self { store, memory_ceiling_mb: GraphConfig::default().memory_ceiling_mb, root_dir })
    }

    /// Runs the request loop to completion; returns the process exit code.
    pub fn run(self) -> std::io::Result<i32> {
        stdio::run_stdio(self.store, self.memory_ceiling_mb)
    }
}
