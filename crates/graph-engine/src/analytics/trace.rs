//! Function Trace (spec.md §4.6): a bounded bidirectional BFS anchored at
//! one symbol — three hops downstream (callees), one hop upstream
//! (callers). A single visited/depth map keeps a node from appearing
//! twice if both directions would otherwise reach it.

use std::collections::{HashMap, HashSet, VecDeque};

use graph_core::store::GraphStore;
use graph_core::types::{EdgeDirection, EdgeKind, Symbol, SymbolKind};
use serde::{Deserialize, Serialize};

use super::blast_radius::{blast_radius, DEFAULT_MAX_DEPTH};

pub const DOWNSTREAM_DEPTH: i32 = 3;
pub const UPSTREAM_DEPTH: i32 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceNode {
    pub node_key: String,
    pub label: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub line: u32,
    pub is_sink: bool,
    pub depth: i32,
    pub blast_radius: usize,
    pub complexity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TraceEdge {
    pub source: u64,
    pub target: u64,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionTrace {
    pub nodes: Vec<TraceNode>,
    pub edges: Vec<TraceEdge>,
}

pub fn trace_function<S: GraphStore>(store: &S, symbol_id: u64) -> Option<FunctionTrace> {
    store.get_symbol(symbol_id)?;

    let mut depths: HashMap<u64, i32> = HashMap::new();
    depths.insert(symbol_id, 0);
    let mut edges_seen: HashSet<(u64, u64)> = HashSet::new();
    let mut trace_edges = Vec::new();

    let mut frontier = VecDeque::new();
    frontier.push_back(symbol_id);
    let mut current_depth = 0i32;
    while current_depth < DOWNSTREAM_DEPTH {
        let mut next_frontier = VecDeque::new();
        while let Some(node) = frontier.pop_front() {
            for edge in store.get_edges(node, EdgeDirection::Outgoing) {
                if edges_seen.insert((edge.source_id, edge.target_id)) {
                    trace_edges.push(TraceEdge { source: edge.source_id, target: edge.target_id, kind: edge.kind });
                }
                if !depths.contains_key(&edge.target_id) {
                    depths.insert(edge.target_id, current_depth + 1);
                    next_frontier.push_back(edge.target_id);
                }
            }
        }
        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
        current_depth += 1;
    }

    for edge in store.get_edges(symbol_id, EdgeDirection::Incoming) {
        if edges_seen.insert((edge.source_id, edge.target_id)) {
            trace_edges.push(TraceEdge { source: edge.source_id, target: edge.target_id, kind: edge.kind });
        }
        depths.entry(edge.source_id).or_insert(UPSTREAM_DEPTH);
    }

    let nodes = depths
        .into_iter()
        .filter_map(|(id, depth)| {
            let symbol = store.get_symbol(id)?;
            Some(to_trace_node(store, &symbol, depth))
        })
        .collect();

    Some(FunctionTrace { nodes, edges: trace_edges })
}

fn to_trace_node<S: GraphStore>(store: &S, symbol: &Symbol, depth: i32) -> TraceNode {
    TraceNode {
        node_key: symbol.own_key(),
        label: symbol.name.clone(),
        kind: symbol.kind,
        file_path: symbol.file_path.clone(),
        line: symbol.range.start_line,
        is_sink: is_sink(symbol),
        depth,
        blast_radius: blast_radius(store, symbol.id, DEFAULT_MAX_DEPTH),
        complexity: symbol.complexity,
    }
}

/// Heuristic "this is where side effects happen" classification (spec.md
/// §4.6): either a keyword in the name or file path, or a class whose
/// name reads like a data-access boundary.
fn is_sink(symbol: &Symbol) -> bool {
    const KEYWORDS: [&str; 7] = ["fetch", "query", "execute", "request", "send", "api", "db"];
    let haystack = format!("{}{}", symbol.name.to_lowercase(), symbol.file_path.to_lowercase());
    if KEYWORDS.iter().any(|k| haystack.contains(k)) {
        return true;
    }
    symbol.kind == SymbolKind::Class
        && (symbol.name.contains("DB") || symbol.name.contains("Service") || symbol.name.contains("Client"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_core::sqlite::SqliteGraphStore;
    use graph_core::types::Range;

    fn symbol(name: &str, kind: SymbolKind, file: &str) -> Symbol {
        Symbol {
            id: 0,
            name: name.to_string(),
            kind,
            file_path: file.to_string(),
            range: Range { start_line: 1, start_column: 0, end_line: 1, end_column: 1 },
            complexity: 1,
        }
    }

    #[test]
    fn test_trace_includes_one_upstream_hop_and_three_downstream_hops() {
        let mut store = SqliteGraphStore::in_memory().unwrap();
        let ids = store
            .insert_symbols(&[
                symbol("caller", SymbolKind::Function, "a.ts"),
                symbol("root", SymbolKind::Function, "a.ts"),
                symbol("d1", SymbolKind::Function, "a.ts"),
                symbol("d2", SymbolKind::Function, "a.ts"),
                symbol("d3", SymbolKind::Function, "a.ts"),
                symbol("d4", SymbolKind::Function, "a.ts"),
            ])
            .unwrap();
        store
            .insert_edge_batch(
                &[
                    (ids[0], ids[1]),
                    (ids[1], ids[2]),
                    (ids[2], ids[3]),
                    (ids[3], ids[4]),
                    (ids[4], ids[5]),
                ],
                EdgeKind::Call,
            )
            .unwrap();
        let trace = trace_function(&store, ids[1]).unwrap();
        assert!(trace.nodes.iter().any(|n| n.label == "caller" && n.depth == -1));
        assert!(trace.nodes.iter().any(|n| n.label == "d3" && n.depth == 3));
        assert!(!trace.nodes.iter().any(|n| n.label == "d4"));
    }

    #[test]
    fn test_is_sink_matches_keyword_in_name() {
        let s = symbol("fetchUser", SymbolKind::Function, "a.ts");
        assert!(is_sink(&s));
    }

    #[test]
    fn test_is_sink_matches_db_class() {
        let s = symbol("UserDB", SymbolKind::Class, "a.ts");
        assert!(is_sink(&s));
    }

    #[test]
    fn test_is_sink_false_for_plain_function() {
        let s = symbol("add", SymbolKind::Function, "a.ts");
        assert!(!is_sink(&s));
    }

    #[test]
    fn test_trace_of_unknown_symbol_is_none() {
        let store = SqliteGraphStore::in_memory().unwrap();
        assert!(trace_function(&store, 999).is_none());
    }
}
