//! Graph analytics (spec.md §4.6): blast radius, fragility, the
//! architecture skeleton, and the function trace — all built on bounded
//! BFS over `GraphStore` query results. Grounded on
//! `keel-enforce/src/engine.rs::collect_adjacency`'s BFS-over-store-queries
//! pattern, generalized from caller/callee classification to the four
//! derived views named here.

pub mod blast_radius;
pub mod fragility;
pub mod skeleton;
pub mod trace;
