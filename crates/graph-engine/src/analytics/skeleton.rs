//! Architecture Skeleton (spec.md §4.6): a folder/file tree with
//! aggregated metrics and domain labels, cached under
//! `meta.architecture_skeleton`.
//!
//! Built from a single `export_graph()` snapshot rather than one
//! `GraphStore` call per symbol — the skeleton already walks every symbol
//! and edge once, so local adjacency maps are cheaper than repeated
//! queries, unlike blast-radius/trace which are anchored at one node and
//! genuinely benefit from `GraphStore`'s indexed lookups.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use graph_core::paths;
use graph_core::sqlite::SKELETON_SKIP_SEGMENTS as SKIP_SEGMENTS;
use graph_core::store::GraphStore;
use graph_core::types::{EdgeKind, Symbol};
use serde::{Deserialize, Serialize};

use super::blast_radius::DEFAULT_MAX_DEPTH;

/// Folder → domain heuristic map (spec.md §4.6 step 7). Checked
/// top-down; the first matching prefix wins and is inherited by
/// descendants unless a more specific prefix overrides it.
const DOMAIN_MAP: &[(&str, &str)] = &[
    ("src/app", "User Interface"),
    ("src/api", "API Layer"),
    ("src/lib", "Infrastructure/Utils"),
    ("src/components", "UI Components"),
    ("src/hooks", "React Hooks"),
    ("src/services", "Business Services"),
    ("src/worker", "Background Workers"),
    ("src/db", "Data Layer"),
];

const MAX_IMPORT_PATHS: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    pub path: String,
    pub symbol_count: u32,
    pub avg_complexity: f64,
    pub avg_fragility: f64,
    pub total_blast_radius: u32,
    pub import_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    pub path: String,
    pub folders: Vec<FolderNode>,
    pub files: Vec<FileNode>,
    pub symbol_count: u32,
    pub avg_complexity: f64,
    pub avg_fragility: f64,
    pub total_blast_radius: u32,
    pub import_paths: Vec<String>,
    pub domain_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonEdge {
    pub source_file: String,
    pub target_file: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureSkeleton {
    pub root: FolderNode,
    pub edges: Vec<SkeletonEdge>,
}

pub fn build_skeleton<S: GraphStore>(store: &S) -> ArchitectureSkeleton {
    let (symbols, edges) = store.export_graph();
    let id_to_symbol: HashMap<u64, &Symbol> = symbols.iter().map(|s| (s.id, s)).collect();

    let all_paths = store.all_file_paths();
    let workspace_root = paths::find_common_prefix(&all_paths);
    let relevant_paths: Vec<String> =
        all_paths.into_iter().filter(|p| !has_skip_segment(p)).collect();

    let mut symbols_by_file: HashMap<&str, Vec<&Symbol>> = HashMap::new();
    for symbol in &symbols {
        symbols_by_file.entry(symbol.file_path.as_str()).or_default().push(symbol);
    }

    let mut out_degree: HashMap<u64, u32> = HashMap::new();
    let mut incoming: HashMap<u64, Vec<u64>> = HashMap::new();
    for edge in &edges {
        *out_degree.entry(edge.source_id).or_insert(0) += 1;
        incoming.entry(edge.target_id).or_default().push(edge.source_id);
    }

    let mut skeleton_edge_counts: HashMap<(String, String), u32> = HashMap::new();
    let mut import_targets: HashMap<&str, Vec<String>> = HashMap::new();
    for edge in &edges {
        let (Some(source), Some(target)) =
            (id_to_symbol.get(&edge.source_id), id_to_symbol.get(&edge.target_id))
        else {
            continue;
        };
        if source.file_path == target.file_path {
            continue;
        }
        *skeleton_edge_counts
            .entry((source.file_path.clone(), target.file_path.clone()))
            .or_insert(0) += 1;
        if edge.kind == EdgeKind::Import {
            import_targets.entry(source.file_path.as_str()).or_default().push(target.file_path.clone());
        }
    }

    let skeleton_edges = skeleton_edge_counts
        .into_iter()
        .map(|((source_file, target_file), weight)| SkeletonEdge { source_file, target_file, weight })
        .collect();

    let mut file_nodes = Vec::new();
    for path in &relevant_paths {
        let syms = symbols_by_file.get(path.as_str()).cloned().unwrap_or_default();
        let symbol_count = syms.len() as u32;
        let avg_complexity = mean(syms.iter().map(|s| s.complexity as f64));
        let avg_fragility = mean(syms.iter().map(|s| {
            let out = *out_degree.get(&s.id).unwrap_or(&0) as f64;
            s.complexity as f64 * (out + 1.0)
        }));
        let total_blast_radius =
            syms.iter().map(|s| local_blast_radius(&incoming, s.id) as u32).max().unwrap_or(0);
        let mut import_paths = import_targets.get(path.as_str()).cloned().unwrap_or_default();
        dedup_sorted(&mut import_paths);

        file_nodes.push(FileNode {
            path: path.clone(),
            symbol_count,
            avg_complexity,
            avg_fragility,
            total_blast_radius,
            import_paths,
        });
    }

    let root = build_folder_tree(&workspace_root, file_nodes);
    ArchitectureSkeleton { root, edges: skeleton_edges }
}

fn has_skip_segment(path: &str) -> bool {
    path.split('/').any(|segment| SKIP_SEGMENTS.contains(&segment))
}

fn mean(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let count = values.clone().count();
    if count == 0 {
        0.0
    } else {
        values.sum::<f64>() / count as f64
    }
}

fn dedup_sorted(values: &mut Vec<String>) {
    values.sort();
    values.dedup();
}

/// Reverse-BFS over a locally-built adjacency map, mirroring
/// `blast_radius::blast_radius` without re-querying the store per symbol.
fn local_blast_radius(incoming: &HashMap<u64, Vec<u64>>, start: u64) -> usize {
    let mut visited = HashSet::new();
    visited.insert(start);
    let mut frontier = VecDeque::new();
    frontier.push_back((start, 0u32));
    while let Some((current, depth)) = frontier.pop_front() {
        if depth >= DEFAULT_MAX_DEPTH {
            continue;
        }
        if let Some(sources) = incoming.get(&current) {
            for &source in sources {
                if visited.insert(source) {
                    frontier.push_back((source, depth + 1));
                }
            }
        }
    }
    visited.len() - 1
}

struct FolderBuilder {
    path: String,
    folders: BTreeMap<String, FolderBuilder>,
    files: Vec<FileNode>,
}

impl FolderBuilder {
    fn new(path: String) -> Self {
        Self { path, folders: BTreeMap::new(), files: Vec::new() }
    }

    fn insert(&mut self, segments: &[&str], node: FileNode) {
        match segments {
            [] | [_] => self.files.push(node),
            [first, rest @ ..] => {
                let child_path =
                    if self.path.is_empty() { (*first).to_string() } else { format!("{}/{}", self.path, first) };
                self.folders
                    .entry((*first).to_string())
                    .or_insert_with(|| FolderBuilder::new(child_path))
                    .insert(rest, node);
            }
        }
    }
}

/// Builds the nested folder/file tree from each file's full path segments
/// (file_paths are already relative to the repo, e.g. `"src/db/a.ts"`),
/// so intermediate folder nodes land at the same paths the domain map
/// keys on (`"src/db"`, not `"db"`). `workspace_root` only labels the
/// resulting root node; it does not change where files nest.
fn build_folder_tree(workspace_root: &str, file_nodes: Vec<FileNode>) -> FolderNode {
    let mut root_builder = FolderBuilder::new(String::new());
    for node in file_nodes {
        let segments: Vec<&str> = node.path.split('/').collect();
        root_builder.insert(&segments, node);
    }
    let mut root = finalize_folder(root_builder);
    root.path = workspace_root.to_string();
    assign_domains(&mut root, None);
    root
}

fn finalize_folder(builder: FolderBuilder) -> FolderNode {
    let folders: Vec<FolderNode> = builder.folders.into_values().map(finalize_folder).collect();
    let files = builder.files;

    let symbol_count: u32 =
        files.iter().map(|f| f.symbol_count).sum::<u32>() + folders.iter().map(|f| f.symbol_count).sum::<u32>();

    let weighted_complexity: f64 = files.iter().map(|f| f.avg_complexity * f.symbol_count as f64).sum::<f64>()
        + folders.iter().map(|f| f.avg_complexity * f.symbol_count as f64).sum::<f64>();
    let avg_complexity = if symbol_count == 0 { 0.0 } else { weighted_complexity / symbol_count as f64 };

    let fragility_sum: f64 =
        files.iter().map(|f| f.avg_fragility).sum::<f64>() + folders.iter().map(|f| f.avg_fragility).sum::<f64>();
    let avg_fragility = (fragility_sum * 10.0).round() / 10.0;

    let total_blast_radius = files
        .iter()
        .map(|f| f.total_blast_radius)
        .chain(folders.iter().map(|f| f.total_blast_radius))
        .max()
        .unwrap_or(0);

    let mut import_paths: Vec<String> = files
        .iter()
        .flat_map(|f| f.import_paths.iter().cloned())
        .chain(folders.iter().flat_map(|f| f.import_paths.iter().cloned()))
        .collect();
    dedup_sorted(&mut import_paths);
    import_paths.truncate(MAX_IMPORT_PATHS);

    FolderNode {
        path: builder.path,
        folders,
        files,
        symbol_count,
        avg_complexity,
        avg_fragility,
        total_blast_radius,
        import_paths,
        domain_name: None,
    }
}

fn assign_domains(node: &mut FolderNode, inherited: Option<String>) {
    let own = DOMAIN_MAP
        .iter()
        .find(|(prefix, _)| node.path == *prefix || node.path.starts_with(&format!("{prefix}/")))
        .map(|(_, domain)| domain.to_string());
    let effective = own.or(inherited);
    node.domain_name = effective.clone();
    for child in &mut node.folders {
        assign_domains(child, effective.clone());
    }
}

/// Whether the symbol count transitioning from `previous` to `current`
/// crosses zero, i.e. whether the cached skeleton must be rewritten
/// (spec.md §4.6 step 8).
pub fn symbol_count_crossed_zero(previous: u64, current: u64) -> bool {
    (previous == 0) != (current == 0)
}

pub fn cache_skeleton<S: GraphStore>(
    store: &mut S,
    skeleton: &ArchitectureSkeleton,
) -> Result<(), graph_core::types::GraphError> {
    let payload = serde_json::to_string(skeleton)
        .map_err(|e| graph_core::types::GraphError::Internal(e.to_string()))?;
    store.set_meta("architecture_skeleton", &payload)
}

pub fn cached_skeleton<S: GraphStore>(store: &S) -> Option<ArchitectureSkeleton> {
    let payload = store.get_meta("architecture_skeleton")?;
    serde_json::from_str(&payload).ok()
}

#[cfg(test)]
#[path = "skeleton_tests.rs"]
mod tests;
