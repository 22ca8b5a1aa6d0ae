//! The worker's request loop (spec.md §4.7, §5): read one line from
//! stdin, dispatch it to completion, write one response line, repeat.
//! Strictly single-threaded and cooperative from the dispatch side — no
//! request is dispatched while another is in flight, and only this loop
//! ever touches the store. Grounded on `keel-server/src/mcp.rs::run_stdio`,
//! the plainer of the teacher's two stdio loops (the other,
//! `mcp_stdio.rs`, layers in telemetry this interface has no counterpart
//! for).
//!
//! Two helper threads feed this loop over a channel rather than it
//! polling stdin directly: one blocks on `BufRead::lines()` and forwards
//! each line, the other sleeps in `MEMORY_CHECK_INTERVAL` increments and
//! forwards a breach notice (spec.md §4.7: "a background thread that
//! only reads process RSS and sends a shutdown signal back to the main
//! loop"). This is what makes the memory check genuinely periodic: it
//! keeps running while the main loop is parked waiting on the next
//! request, not just between requests.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use graph_core::store::GraphStore;
use graph_engine::IndexEngine;

use crate::dispatch::{self, SharedEngine};
use crate::memory::MemoryWatchdog;
use crate::protocol;

/// How often the background thread samples resident memory (spec.md
/// §4.7: "every 5s").
const MEMORY_CHECK_INTERVAL: Duration = Duration::from_secs(5);

enum WorkerEvent {
    Line(String),
    StdinClosed,
    MemoryCeilingBreached(u32),
}

/// Runs the worker loop to completion. Returns the process exit code
/// (spec.md §6): `0` on a `shutdown` request or stdin close, `137` on a
/// memory-ceiling breach.
pub fn run_stdio<S: GraphStore + 'static>(store: S, memory_ceiling_mb: u32) -> io::Result<i32> {
    let engine: SharedEngine<S> = Arc::new(Mutex::new(IndexEngine::new(store)));
    let (tx, rx) = mpsc::channel::<WorkerEvent>();

    let line_tx = tx.clone();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) if line_tx.send(WorkerEvent::Line(line)).is_ok() => continue,
                _ => break,
            }
        }
        let _ = line_tx.send(WorkerEvent::StdinClosed);
    });

    thread::spawn(move || {
        let watchdog = MemoryWatchdog::new(memory_ceiling_mb);
        loop {
            thread::sleep(MEMORY_CHECK_INTERVAL);
            if let Some(resident_mb) = watchdog.check() {
                let _ = tx.send(WorkerEvent::MemoryCeilingBreached(resident_mb));
                return;
            }
        }
    });

    let stdout = io::stdout();
    for event in rx {
        match event {
            WorkerEvent::Line(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let response = process_line(&engine, &line);
                let is_shutdown = response.get("type").and_then(|t| t.as_str()) == Some("shutdown-complete");
                write_response(&stdout, &response)?;
                if is_shutdown {
                    tracing::info!("shutdown requested, exiting");
                    return Ok(protocol::EXIT_OK);
                }
            }
            WorkerEvent::StdinClosed => return Ok(protocol::EXIT_OK),
            WorkerEvent::MemoryCeilingBreached(resident_mb) => {
                tracing::error!(resident_mb, ceiling_mb = memory_ceiling_mb, "memory ceiling breached");
                let response = protocol::system_error(format!(
                    "memory ceiling breached: {resident_mb}MB resident, ceiling {memory_ceiling_mb}MB"
                ));
                write_response(&stdout, &response)?;
                return Ok(protocol::EXIT_MEMORY_CEILING);
            }
        }
    }

    Ok(protocol::EXIT_OK)
}

fn process_line<S: GraphStore>(engine: &SharedEngine<S>, line: &str) -> serde_json::Value {
    match protocol::parse_request(line) {
        Ok(request) => dispatch::dispatch(engine, &request),
        Err(e) => protocol::error_response(serde_json::Value::Null, e),
    }
}

fn write_response(stdout: &io::Stdout, response: &serde_json::Value) -> io::Result<()> {
    let mut out = stdout.lock();
    writeln!(out, "{response}")?;
    out.flush()
}
