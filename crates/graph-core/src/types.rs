use serde::{Deserialize, Serialize};

/// The declared kind of a `Symbol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    Type,
    Enum,
    Variable,
    Struct,
    Union,
    Decorator,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Type => "type",
            SymbolKind::Enum => "enum",
            SymbolKind::Variable => "variable",
            SymbolKind::Struct => "struct",
            SymbolKind::Union => "union",
            SymbolKind::Decorator => "decorator",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge kinds between graph symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Call,
    Import,
    Implicit,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Call => "call",
            EdgeKind::Import => "import",
            EdgeKind::Implicit => "implicit",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 1-based line / 0-based column source range, per §3 and §6's node-key
/// convention note: lines are 1-based everywhere except the extractor's
/// internal symbol-key (see `Symbol::key`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

/// A declared code entity: function, method, class, interface, type, enum,
/// variable, struct, union, or decorator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub id: u64,
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub range: Range,
    pub complexity: u32,
}

impl Symbol {
    /// Synthesizes the extractor-internal symbol-key: 0-based start line.
    /// This is the single point where the 1-based/0-based conventions meet
    /// (spec.md §9b) — every other consumer of a symbol-key goes through
    /// this function rather than re-deriving the line offset.
    pub fn key(file_path: &str, name: &str, start_line_1based: u32) -> String {
        format!("{}:{}:{}", file_path, name, start_line_1based.saturating_sub(1))
    }

    pub fn own_key(&self) -> String {
        Self::key(&self.file_path, &self.name, self.range.start_line)
    }
}

/// Optional enrichment attached to a `Symbol` by downstream analysis.
/// Modeled as a separate one-to-one record keyed by symbol id rather than
/// dynamic fields bolted onto `Symbol` (spec.md §9, "dynamic field
/// overlays").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolEnrichment {
    pub domain: Option<String>,
    pub purpose: Option<String>,
    pub impact_depth: Option<u32>,
    pub search_tags: Option<Vec<String>>,
    pub fragility: Option<f64>,
    pub risk_score: Option<f64>,
    pub risk_reason: Option<String>,
}

/// A directed relationship between two Symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: u64,
    pub source_id: u64,
    pub target_id: u64,
    pub kind: EdgeKind,
    pub reason: Option<String>,
}

/// An indexed source file: presence means "symbols for this path reflect
/// content_hash".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedFile {
    pub file_path: String,
    pub content_hash: String,
    pub last_indexed_at: String,
}

/// Direction for edge traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    Incoming,
    Outgoing,
    Both,
}

/// Source languages the Parser Facade can register a grammar for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Typescript,
    Tsx,
    Python,
    C,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ts" => Some(Language::Typescript),
            "tsx" => Some(Language::Tsx),
            "py" => Some(Language::Python),
            "c" | "h" => Some(Language::C),
            _ => None,
        }
    }
}

/// Transient per-file import record; never persisted (spec.md §3).
#[derive(Debug, Clone)]
pub struct ImportInfo {
    pub imported_name: String,
    pub local_name: String,
    pub source_module: String,
    pub file_path: String,
    pub line: u32,
}

/// Transient per-file call record; never persisted (spec.md §3).
#[derive(Debug, Clone)]
pub struct CallInfo {
    pub caller_symbol_key: String,
    pub callee_name: String,
    pub file_path: String,
    pub line: u32,
    pub scope_context: String,
    pub is_imported: bool,
    pub import_source_module: Option<String>,
    pub imported_original_name: Option<String>,
}

/// A lexical scope frame maintained during traversal; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Class,
    Function,
    Block,
}

#[derive(Debug, Clone)]
pub struct ScopeEntry {
    pub name: String,
    pub kind: ScopeKind,
    pub line: u32,
}

/// Errors surfaced by the graph store. Mirrors the taxonomy in spec.md §7:
/// only integrity/schema errors cross this boundary, never "not found".
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("edge not found: {0}")]
    EdgeNotFound(u64),

    #[error("database error: {0}")]
    Database(String),

    #[error("schema migration required: v{from} -> v{to}")]
    SchemaMigration { from: u32, to: u32 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for GraphError {
    fn from(e: rusqlite::Error) -> Self {
        GraphError::Database(e.to_string())
    }
}
