//! Command table (spec.md §6): one handler per request `type`, all
//! routed through a single `IndexEngine` guarded by a mutex. Grounded on
//! `keel-server/src/mcp.rs::dispatch`'s match-based routing and its
//! `lock_store` helper, generalized from a JSON-RPC method string to this
//! protocol's `type` tag.

use std::sync::{Arc, Mutex};

use graph_core::store::GraphStore;
use graph_core::types::{EdgeDirection, GraphError, Language};
use graph_engine::analytics::{blast_radius, skeleton, trace};
use graph_engine::IndexEngine;
use serde_json::Value;

use crate::protocol::{self, Request};

pub type SharedEngine<S> = Arc<Mutex<IndexEngine<S>>>;

/// Risk buckets for `analyze-impact` (spec.md §6 names the field but
/// leaves its thresholds unspecified; see DESIGN.md for the rationale).
fn risk_level(total_affected: usize) -> &'static str {
    match total_affected {
        0..=5 => "low",
        6..=20 => "medium",
        _ => "high",
    }
}

fn lock_engine<S: GraphStore>(engine: &SharedEngine<S>) -> Result<std::sync::MutexGuard<'_, IndexEngine<S>>, String> {
    engine.lock().map_err(|_| "engine lock poisoned".to_string())
}

fn str_field<'a>(body: &'a Value, name: &str) -> Result<&'a str, String> {
    body.get(name).and_then(Value::as_str).ok_or_else(|| format!("missing '{name}' field"))
}

fn u64_field(body: &Value, name: &str) -> Result<u64, String> {
    body.get(name).and_then(Value::as_u64).ok_or_else(|| format!("missing '{name}' field"))
}

fn bool_field(body: &Value, name: &str, default: bool) -> bool {
    body.get(name).and_then(Value::as_bool).unwrap_or(default)
}

fn content_field<'a>(body: &'a Value, name: &str) -> Result<&'a [u8], String> {
    Ok(str_field(body, name)?.as_bytes())
}

fn parse_language(body: &Value) -> Result<Language, String> {
    let raw = str_field(body, "language")?;
    match raw {
        "typescript" | "ts" => Ok(Language::Typescript),
        "tsx" => Ok(Language::Tsx),
        "python" | "py" => Ok(Language::Python),
        "c" => Ok(Language::C),
        other => Err(format!("unsupported language: {other}")),
    }
}

/// Splits a node-key (`"<file_path>:<name>:<line>"`) into its three
/// parts. Rightmost two colons are the split points, since `file_path`
/// is the only component that may itself contain `:`.
fn split_node_key(key: &str) -> Option<(&str, &str, u32)> {
    let mut parts = key.rsplitn(3, ':');
    let line = parts.next()?.parse().ok()?;
    let name = parts.next()?;
    let file_path = parts.next()?;
    Some((file_path, name, line))
}

/// Resolves a `symbolId` or `nodeId` field (spec.md §6: `trace-function`
/// and `analyze-impact` accept either) to a persisted symbol id.
fn resolve_symbol_id<S: GraphStore>(store: &S, body: &Value) -> Result<u64, String> {
    if let Some(id) = body.get("symbolId").and_then(Value::as_u64) {
        return Ok(id);
    }
    let node_id = body.get("nodeId").ok_or("missing 'symbolId' or 'nodeId' field")?;
    if let Some(id) = node_id.as_u64() {
        return Ok(id);
    }
    let key = node_id.as_str().ok_or("'nodeId' must be a string or integer")?;
    let (file_path, name, line) = split_node_key(key).ok_or_else(|| format!("malformed nodeId: {key}"))?;
    store
        .get_symbols_in_file(file_path)
        .into_iter()
        .find(|s| s.name == name && s.range.start_line == line)
        .map(|s| s.id)
        .ok_or_else(|| format!("node not found: {key}"))
}

pub fn dispatch<S: GraphStore>(engine: &SharedEngine<S>, request: &Request) -> Value {
    let Request { kind, id, body } = request;
    let result = match kind.as_str() {
        "parse" => handle_parse(engine, body),
        "parse-batch" => handle_parse_batch(engine, body),
        "check-file-hash" => handle_check_file_hash(engine, body),
        "query-symbols" => handle_query_symbols(engine, body),
        "query-file" => handle_query_file(engine, body),
        "get-context" => handle_get_context(engine, body),
        "export-graph" => handle_export_graph(engine),
        "stats" => handle_stats(engine),
        "clear" => handle_clear(engine),
        "get-architecture-skeleton" => handle_get_architecture_skeleton(engine, body),
        "trace-function" => handle_trace_function(engine, body),
        "analyze-impact" => handle_analyze_impact(engine, body),
        "shutdown" => Ok(("shutdown-complete", Value::Null)),
        other => Err(format!("unknown request type: {other}")),
    };

    match result {
        Ok((response_type, payload)) => protocol::ok_response(id.clone(), response_type, payload),
        Err(e) => protocol::error_response(id.clone(), e),
    }
}

type HandlerResult = Result<(&'static str, Value), String>;

fn handle_parse<S: GraphStore>(engine: &SharedEngine<S>, body: &Value) -> HandlerResult {
    let file_path = str_field(body, "filePath")?;
    let content = content_field(body, "content")?;
    let language = parse_language(body)?;

    let mut engine = lock_engine(engine)?;
    let result = engine.index_file(file_path, content, language).map_err(graph_error_message)?;
    Ok((
        "parse-complete",
        serde_json::json!({
            "symbolCount": result.symbols_inserted,
            "edgeCount": result.edges_inserted,
        }),
    ))
}

fn handle_parse_batch<S: GraphStore>(engine: &SharedEngine<S>, body: &Value) -> HandlerResult {
    let files_value = body.get("files").ok_or("missing 'files' field")?;
    let entries = files_value.as_array().ok_or("'files' must be an array")?;

    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        let file_path = str_field(entry, "filePath")?.to_string();
        let content = str_field(entry, "content")?.as_bytes().to_vec();
        let language = parse_language(entry)?;
        files.push((file_path, content, language));
    }

    let mut engine = lock_engine(engine)?;
    let result = engine.index_batch(&files).map_err(graph_error_message)?;
    Ok((
        "parse-batch-complete",
        serde_json::json!({
            "totalSymbols": result.total_symbols,
            "totalEdges": result.total_edges,
            "filesProcessed": result.files_processed,
        }),
    ))
}

fn handle_check_file_hash<S: GraphStore>(engine: &SharedEngine<S>, body: &Value) -> HandlerResult {
    let file_path = str_field(body, "filePath")?;
    let content = content_field(body, "content")?;

    let engine = lock_engine(engine)?;
    let check = engine.check_file_hash(file_path, content);
    Ok((
        "file-hash-result",
        serde_json::json!({
            "needsReindex": check.needs_reindex,
            "storedHash": check.stored_hash,
            "currentHash": check.current_hash,
        }),
    ))
}

fn handle_query_symbols<S: GraphStore>(engine: &SharedEngine<S>, body: &Value) -> HandlerResult {
    let query = str_field(body, "query")?;
    let engine = lock_engine(engine)?;
    let symbols = engine.store().get_symbols_by_name(query);
    Ok(("query-result", serde_json::json!({ "symbols": symbols })))
}

fn handle_query_file<S: GraphStore>(engine: &SharedEngine<S>, body: &Value) -> HandlerResult {
    let file_path = str_field(body, "filePath")?;
    let engine = lock_engine(engine)?;
    let symbols = engine.store().get_symbols_in_file(file_path);
    Ok(("query-result", serde_json::json!({ "symbols": symbols })))
}

fn handle_get_context<S: GraphStore>(engine: &SharedEngine<S>, body: &Value) -> HandlerResult {
    let symbol_id = u64_field(body, "symbolId")?;
    let engine = lock_engine(engine)?;
    let store = engine.store();
    let symbol = store.get_symbol(symbol_id).ok_or_else(|| format!("symbol not found: {symbol_id}"))?;

    let incoming = store.get_edges(symbol_id, EdgeDirection::Incoming);
    let outgoing = store.get_edges(symbol_id, EdgeDirection::Outgoing);

    let mut neighbor_ids: Vec<u64> =
        incoming.iter().map(|e| e.source_id).chain(outgoing.iter().map(|e| e.target_id)).collect();
    neighbor_ids.sort_unstable();
    neighbor_ids.dedup();
    let neighbors: Vec<_> = neighbor_ids.into_iter().filter_map(|id| store.get_symbol(id)).collect();

    Ok((
        "context-result",
        serde_json::json!({
            "symbol": symbol,
            "neighbors": neighbors,
            "incomingEdgeCount": incoming.len(),
            "outgoingEdgeCount": outgoing.len(),
        }),
    ))
}

fn handle_export_graph<S: GraphStore>(engine: &SharedEngine<S>) -> HandlerResult {
    let engine = lock_engine(engine)?;
    let (symbols, edges) = engine.store().export_graph();
    Ok(("graph-export", serde_json::json!({ "graph": { "symbols": symbols, "edges": edges } })))
}

fn handle_stats<S: GraphStore>(engine: &SharedEngine<S>) -> HandlerResult {
    let engine = lock_engine(engine)?;
    let store = engine.store();
    let (symbol_count, edge_count, file_count) = store.stats();
    let last_index_time = store.get_meta("last_index_time");
    Ok((
        "stats-result",
        serde_json::json!({
            "symbolCount": symbol_count,
            "edgeCount": edge_count,
            "fileCount": file_count,
            "lastIndexTime": last_index_time,
        }),
    ))
}

fn handle_clear<S: GraphStore>(engine: &SharedEngine<S>) -> HandlerResult {
    let mut engine = lock_engine(engine)?;
    engine.store_mut().clear().map_err(graph_error_message)?;
    Ok(("clear-complete", Value::Null))
}

fn handle_get_architecture_skeleton<S: GraphStore>(engine: &SharedEngine<S>, body: &Value) -> HandlerResult {
    let refine = bool_field(body, "refine", false);
    let mut engine = lock_engine(engine)?;
    let store = engine.store_mut();

    let built = if refine { None } else { skeleton::cached_skeleton(store) };
    let skeleton = match built {
        Some(cached) => cached,
        None => {
            let fresh = skeleton::build_skeleton(store);
            skeleton::cache_skeleton(store, &fresh).map_err(graph_error_message)?;
            fresh
        }
    };
    Ok(("architecture-skeleton", serde_json::json!({ "skeleton": skeleton })))
}

fn handle_trace_function<S: GraphStore>(engine: &SharedEngine<S>, body: &Value) -> HandlerResult {
    let engine = lock_engine(engine)?;
    let store = engine.store();
    let symbol_id = resolve_symbol_id(store, body)?;
    let function_trace =
        trace::trace_function(store, symbol_id).ok_or_else(|| format!("symbol not found: {symbol_id}"))?;
    Ok(("function-trace", serde_json::json!({ "trace": function_trace })))
}

fn handle_analyze_impact<S: GraphStore>(engine: &SharedEngine<S>, body: &Value) -> HandlerResult {
    let engine = lock_engine(engine)?;
    let store = engine.store();
    let symbol_id = resolve_symbol_id(store, body)?;
    store.get_symbol(symbol_id).ok_or_else(|| format!("symbol not found: {symbol_id}"))?;

    let max_depth = blast_radius::DEFAULT_MAX_DEPTH;
    let affected = blast_radius::reachable(store, symbol_id, max_depth);
    let total_affected = affected.len();

    Ok((
        "impact-result",
        serde_json::json!({
            "affected": affected,
            "totalAffected": total_affected,
            "riskLevel": risk_level(total_affected),
        }),
    ))
}

fn graph_error_message(e: GraphError) -> String {
    e.to_string()
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
