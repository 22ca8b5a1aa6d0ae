//! Dev harness for the code graph indexer: batch-index a workspace,
//! run the worker loop, and inspect the resulting store from a shell.

use clap::Parser;

mod cli_args;
mod commands;
mod walker;

use cli_args::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let root = cli.root.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| ".".into()));
    let db_path = cli.db.unwrap_or_else(|| root.join(".codegraph").join("graph.db"));
    if let Some(parent) = db_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let exit_code = match cli.command {
        Commands::Index => commands::index::run(&root, &db_path),
        Commands::Serve => commands::serve::run(&root, &db_path),
        Commands::Stats => commands::stats::run(&db_path),
        Commands::Clear => commands::clear::run(&db_path),
        Commands::Query { name } => commands::query::run(&db_path, &name),
    };

    std::process::exit(exit_code);
}
