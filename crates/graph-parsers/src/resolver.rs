//! Batch edge resolution (spec.md §4.3): the three-strategy call-edge
//! ladder plus import-edge resolution against the re-export caveat
//! documented in spec.md §9a.
//!
//! Takes the union of `CallInfo`/`ImportInfo` across a batch plus the
//! global symbol-key→id map assembled after all of the batch's symbols are
//! committed, and produces `(source_id, target_id)` pairs ready for
//! `GraphStore::insert_edge_batch`. Grounded on this codebase's resolver
//! contract (`resolver.rs`'s `LanguageResolver::resolve_call_edge`), but
//! replacing per-language trait dispatch with a single ladder shared across
//! languages, per spec.md.

use std::collections::{HashMap, HashSet};

use graph_core::types::{CallInfo, ImportInfo, Symbol};

/// `global` is the batch's key→id map in insertion order: a `Vec` rather
/// than a `HashMap` so the "first match in insertion order wins" tie-break
/// (spec.md §4.3) is actually deterministic, not merely documented as such.
pub fn resolve_calls(calls: &[CallInfo], global: &[(String, u64)]) -> Vec<(u64, u64)> {
    let exact: HashMap<&str, u64> = global.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for call in calls {
        let Some(&source_id) = exact.get(call.caller_symbol_key.as_str()) else { continue };
        let Some(target_id) = resolve_call_target(call, global) else { continue };
        if source_id == target_id {
            continue;
        }
        if seen.insert((source_id, target_id)) {
            edges.push((source_id, target_id));
        }
    }
    edges
}

fn resolve_call_target(call: &CallInfo, global: &[(String, u64)]) -> Option<u64> {
    // Strategy 1: import bridge.
    if call.is_imported {
        if let Some(module) = &call.import_source_module {
            let module_norm = normalize_module(module);
            let wanted_name = call.imported_original_name.as_deref().unwrap_or(&call.callee_name);
            if let Some(id) = find_by_path_suffix_and_name(global, &module_norm, wanted_name) {
                return Some(id);
            }
        }
    }
    // Strategy 2: same-file resolution.
    if let Some(id) = find_same_file(global, &call.file_path, &call.callee_name) {
        return Some(id);
    }
    // Strategy 3: global name fallback.
    find_by_name_anywhere(global, &call.callee_name)
}

/// Import edges almost never materialize (spec.md §9a): emission requires
/// a declared symbol sitting exactly at the import statement's own line
/// (i.e. the import also happens to be a re-export), which source rarely
/// is. `edges.type='import'` is therefore a re-export index, not a
/// file-import index — file-import counts come from
/// `GraphStore::file_edge_counts` instead. This is documented behavior,
/// not a bug to silently work around.
pub fn resolve_imports(imports: &[ImportInfo], global: &[(String, u64)]) -> Vec<(u64, u64)> {
    let exact: HashMap<&str, u64> = global.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for imp in imports {
        let module_norm = normalize_module(&imp.source_module);
        let Some(target_id) = find_by_path_suffix_and_name(global, &module_norm, &imp.imported_name) else { continue };
        let importer_key = Symbol::key(&imp.file_path, &imp.local_name, imp.line);
        let Some(&source_id) = exact.get(importer_key.as_str()) else { continue };
        if source_id == target_id {
            continue;
        }
        if seen.insert((source_id, target_id)) {
            edges.push((source_id, target_id));
        }
    }
    edges
}

fn parse_key(key: &str) -> Option<(&str, &str)> {
    let mut parts = key.rsplitn(3, ':');
    let _line = parts.next()?;
    let name = parts.next()?;
    let file_path = parts.next()?;
    Some((file_path, name))
}

fn strip_ts_extensions(path: &str) -> &str {
    for ext in [".tsx", ".ts", ".jsx", ".js"] {
        if let Some(stripped) = path.strip_suffix(ext) {
            return stripped;
        }
    }
    path
}

fn normalize_module(module: &str) -> String {
    strip_ts_extensions(module.trim_start_matches("./")).to_string()
}

fn find_by_path_suffix_and_name(global: &[(String, u64)], module_norm: &str, name: &str) -> Option<u64> {
    global.iter().find_map(|(key, id)| {
        let (file_path, sym_name) = parse_key(key)?;
        (sym_name == name && strip_ts_extensions(file_path).ends_with(module_norm)).then_some(*id)
    })
}

fn find_same_file(global: &[(String, u64)], file_path: &str, name: &str) -> Option<u64> {
    global.iter().find_map(|(key, id)| {
        let (fp, n) = parse_key(key)?;
        (fp == file_path && n == name).then_some(*id)
    })
}

fn find_by_name_anywhere(global: &[(String, u64)], name: &str) -> Option<u64> {
    global.iter().find_map(|(key, id)| {
        let (_, n) = parse_key(key)?;
        (n == name).then_some(*id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(caller: &str, callee: &str, file: &str) -> CallInfo {
        CallInfo {
            caller_symbol_key: caller.to_string(),
            callee_name: callee.to_string(),
            file_path: file.to_string(),
            line: 1,
            scope_context: String::new(),
            is_imported: false,
            import_source_module: None,
            imported_original_name: None,
        }
    }

    fn imported_call(caller: &str, callee: &str, file: &str, module: &str, original: &str) -> CallInfo {
        CallInfo { is_imported: true, import_source_module: Some(module.to_string()), imported_original_name: Some(original.to_string()), ..call(caller, callee, file) }
    }

    #[test]
    fn test_scenario_b_import_bridge_wins_over_global_fallback() {
        let global = vec![
            (Symbol::key("lib.ts", "hash", 1), 1u64),
            (Symbol::key("main.ts", "go", 1), 2u64),
        ];
        let calls = vec![imported_call(&Symbol::key("main.ts", "go", 1), "hash", "main.ts", "./lib", "hash")];
        let edges = resolve_calls(&calls, &global);
        assert_eq!(edges, vec![(2, 1)]);
    }

    #[test]
    fn test_scenario_c_import_bridge_picks_the_imported_file_not_the_other() {
        let global = vec![
            (Symbol::key("a.ts", "util", 1), 1u64),
            (Symbol::key("b.ts", "util", 1), 2u64),
            (Symbol::key("c.ts", "caller", 1), 3u64),
        ];
        let calls = vec![imported_call(&Symbol::key("c.ts", "caller", 1), "util", "c.ts", "./a", "util")];
        let edges = resolve_calls(&calls, &global);
        assert_eq!(edges, vec![(3, 1)]);
    }

    #[test]
    fn test_scenario_c_without_import_falls_back_to_first_insertion_order_match() {
        let global = vec![
            (Symbol::key("a.ts", "util", 1), 1u64),
            (Symbol::key("b.ts", "util", 1), 2u64),
            (Symbol::key("c.ts", "caller", 1), 3u64),
        ];
        let calls = vec![call(&Symbol::key("c.ts", "caller", 1), "util", "c.ts")];
        let edges = resolve_calls(&calls, &global);
        assert_eq!(edges, vec![(3, 1)]);
    }

    #[test]
    fn test_same_file_strategy_used_when_not_imported() {
        let global = vec![
            (Symbol::key("a.ts", "helper", 1), 1u64),
            (Symbol::key("b.ts", "helper", 1), 2u64),
            (Symbol::key("a.ts", "main", 3), 3u64),
        ];
        let calls = vec![call(&Symbol::key("a.ts", "main", 3), "helper", "a.ts")];
        let edges = resolve_calls(&calls, &global);
        assert_eq!(edges, vec![(3, 1)]);
    }

    #[test]
    fn test_self_call_produces_no_edge() {
        let global = vec![(Symbol::key("a.ts", "fact", 1), 1u64)];
        let calls = vec![call(&Symbol::key("a.ts", "fact", 1), "fact", "a.ts")];
        assert!(resolve_calls(&calls, &global).is_empty());
    }

    #[test]
    fn test_unresolved_call_is_dropped_not_an_error() {
        let global = vec![(Symbol::key("a.ts", "main", 1), 1u64)];
        let calls = vec![call(&Symbol::key("a.ts", "main", 1), "nonexistent", "a.ts")];
        assert!(resolve_calls(&calls, &global).is_empty());
    }

    #[test]
    fn test_duplicate_calls_to_same_target_dedupe_to_one_edge() {
        let global = vec![(Symbol::key("a.ts", "helper", 1), 1u64), (Symbol::key("a.ts", "main", 3), 2u64)];
        let calls = vec![call(&Symbol::key("a.ts", "main", 3), "helper", "a.ts"), call(&Symbol::key("a.ts", "main", 3), "helper", "a.ts")];
        assert_eq!(resolve_calls(&calls, &global).len(), 1);
    }

    #[test]
    fn test_import_edge_requires_importer_symbol_at_import_line_per_known_caveat() {
        let global = vec![(Symbol::key("lib.ts", "hash", 1), 1u64)];
        let imports = vec![ImportInfo {
            imported_name: "hash".to_string(),
            local_name: "hash".to_string(),
            source_module: "./lib".to_string(),
            file_path: "main.ts".to_string(),
            line: 1,
        }];
        // No symbol declared at main.ts:hash:0 -> dropped, per spec.md §9a.
        assert!(resolve_imports(&imports, &global).is_empty());
    }

    #[test]
    fn test_import_edge_emitted_when_importer_symbol_exists() {
        let global = vec![(Symbol::key("lib.ts", "hash", 1), 1u64), (Symbol::key("main.ts", "hash", 1), 2u64)];
        let imports = vec![ImportInfo {
            imported_name: "hash".to_string(),
            local_name: "hash".to_string(),
            source_module: "./lib".to_string(),
            file_path: "main.ts".to_string(),
            line: 1,
        }];
        assert_eq!(resolve_imports(&imports, &global), vec![(2, 1)]);
    }
}
