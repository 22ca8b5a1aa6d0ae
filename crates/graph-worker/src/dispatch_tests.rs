use std::sync::{Arc, Mutex};

use graph_core::sqlite::SqliteGraphStore;
use graph_engine::IndexEngine;

use super::*;

fn engine() -> SharedEngine<SqliteGraphStore> {
    Arc::new(Mutex::new(IndexEngine::new(SqliteGraphStore::in_memory().unwrap())))
}

fn req(kind: &str, id: &str, body: Value) -> Request {
    Request { kind: kind.to_string(), id: Value::String(id.to_string()), body }
}

#[test]
fn test_unknown_request_type_is_an_error_response() {
    let engine = engine();
    let response = dispatch(&engine, &req("nonsense", "1", serde_json::json!({})));
    assert_eq!(response["type"], "error");
    assert_eq!(response["id"], "1");
}

#[test]
fn test_stats_on_empty_store() {
    let engine = engine();
    let response = dispatch(&engine, &req("stats", "2", serde_json::json!({})));
    assert_eq!(response["type"], "stats-result");
    assert_eq!(response["symbolCount"], 0);
}

#[test]
fn test_parse_then_stats_reflects_new_symbol() {
    let engine = engine();
    let parse_body = serde_json::json!({
        "filePath": "a.ts",
        "content": "function foo() { return 1; }",
        "language": "typescript",
    });
    let response = dispatch(&engine, &req("parse", "3", parse_body));
    assert_eq!(response["type"], "parse-complete");
    assert_eq!(response["symbolCount"], 1);

    let stats = dispatch(&engine, &req("stats", "4", serde_json::json!({})));
    assert_eq!(stats["symbolCount"], 1);
    assert_eq!(stats["fileCount"], 1);
}

#[test]
fn test_check_file_hash_is_dirty_on_first_sight() {
    let engine = engine();
    let body = serde_json::json!({"filePath": "a.ts", "content": "x"});
    let response = dispatch(&engine, &req("check-file-hash", "5", body));
    assert_eq!(response["type"], "file-hash-result");
    assert_eq!(response["needsReindex"], true);
    assert_eq!(response["storedHash"], Value::Null);
}

#[test]
fn test_clear_resets_stats_to_zero() {
    let engine = engine();
    dispatch(
        &engine,
        &req(
            "parse",
            "6",
            serde_json::json!({"filePath": "a.ts", "content": "function foo() {}", "language": "typescript"}),
        ),
    );
    dispatch(&engine, &req("clear", "7", serde_json::json!({})));
    let stats = dispatch(&engine, &req("stats", "8", serde_json::json!({})));
    assert_eq!(stats["symbolCount"], 0);
}

#[test]
fn test_query_symbols_with_missing_query_field_is_error() {
    let engine = engine();
    let response = dispatch(&engine, &req("query-symbols", "9", serde_json::json!({})));
    assert_eq!(response["type"], "error");
}

#[test]
fn test_analyze_impact_of_unknown_symbol_is_error() {
    let engine = engine();
    let response =
        dispatch(&engine, &req("analyze-impact", "10", serde_json::json!({"symbolId": 999})));
    assert_eq!(response["type"], "error");
}

#[test]
fn test_risk_level_buckets() {
    assert_eq!(risk_level(0), "low");
    assert_eq!(risk_level(5), "low");
    assert_eq!(risk_level(6), "medium");
    assert_eq!(risk_level(20), "medium");
    assert_eq!(risk_level(21), "high");
}

#[test]
fn test_shutdown_returns_shutdown_complete() {
    let engine = engine();
    let response = dispatch(&engine, &req("shutdown", "11", serde_json::json!({})));
    assert_eq!(response["type"], "shutdown-complete");
}

#[test]
fn test_split_node_key_parses_path_name_and_line() {
    let parsed = split_node_key("src/a.ts:foo:4").unwrap();
    assert_eq!(parsed, ("src/a.ts", "foo", 4));
}
