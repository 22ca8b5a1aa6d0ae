//! Fragility (spec.md §4.6): `complexity × (outDegree + 1)`. The `+1`
//! guarantees an isolated complex symbol still reports non-zero fragility.

use graph_core::store::GraphStore;
use graph_core::types::EdgeDirection;

pub fn fragility<S: GraphStore>(store: &S, symbol_id: u64) -> Option<f64> {
    let symbol = store.get_symbol(symbol_id)?;
    let out_degree = store.get_edges(symbol_id, EdgeDirection::Outgoing).len() as f64;
    Some(symbol.complexity as f64 * (out_degree + 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_core::sqlite::SqliteGraphStore;
    use graph_core::types::{EdgeKind, Range, Symbol, SymbolKind};

    fn symbol(name: &str, complexity: u32) -> Symbol {
        Symbol {
            id: 0,
            name: name.to_string(),
            kind: SymbolKind::Function,
            file_path: "a.ts".to_string(),
            range: Range { start_line: 1, start_column: 0, end_line: 1, end_column: 1 },
            complexity,
        }
    }

    #[test]
    fn test_isolated_symbol_fragility_is_complexity_times_one() {
        let mut store = SqliteGraphStore::in_memory().unwrap();
        let ids = store.insert_symbols(&[symbol("a", 4)]).unwrap();
        assert_eq!(fragility(&store, ids[0]), Some(4.0));
    }

    #[test]
    fn test_fragility_scales_with_out_degree() {
        let mut store = SqliteGraphStore::in_memory().unwrap();
        let ids = store.insert_symbols(&[symbol("caller", 3), symbol("a", 1), symbol("b", 1)]).unwrap();
        store
            .insert_edge_batch(&[(ids[0], ids[1]), (ids[0], ids[2])], EdgeKind::Call)
            .unwrap();
        assert_eq!(fragility(&store, ids[0]), Some(9.0));
    }

    #[test]
    fn test_fragility_of_unknown_symbol_is_none() {
        let store = SqliteGraphStore::in_memory().unwrap();
        assert_eq!(fragility(&store, 999), None);
    }
}
