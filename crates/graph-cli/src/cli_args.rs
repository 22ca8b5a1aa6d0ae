use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "graph-index", version, about = "Dev harness for the code graph indexer")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Database file path (defaults to `<root>/.codegraph/graph.db`)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Walk the workspace and batch-index every recognized source file
    Index,

    /// Run the worker's stdin/stdout request loop
    Serve,

    /// Print symbol/edge/file counts and the last index time
    Stats,

    /// Drop the entire index
    Clear,

    /// Look up symbols by exact name
    Query {
        /// Exact symbol name to look up
        name: String,
    },
}
