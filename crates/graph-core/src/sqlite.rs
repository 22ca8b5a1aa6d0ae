use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};

use crate::store::GraphStore;
use crate::types::{
    Edge, EdgeDirection, EdgeKind, GraphError, IndexedFile, Range, Symbol, SymbolEnrichment,
    SymbolKind,
};

const SCHEMA_VERSION: u32 = 1;

/// Folders skipped when building the architecture skeleton and when
/// computing cross-file import counts (spec.md §4.6 step 2).
pub const SKELETON_SKIP_SEGMENTS: &[&str] = &[
    ".next", "node_modules", ".git", "types", "dist", "build", ".venv", "__pycache__",
];

/// SQLite-backed implementation of the GraphStore trait.
pub struct SqliteGraphStore {
    pub(crate) conn: Connection,
}

fn symbol_kind_from_str(s: &str) -> SymbolKind {
    match s {
        "function" => SymbolKind::Function,
        "method" => SymbolKind::Method,
        "class" => SymbolKind::Class,
        "interface" => SymbolKind::Interface,
        "type" => SymbolKind::Type,
        "enum" => SymbolKind::Enum,
        "variable" => SymbolKind::Variable,
        "struct" => SymbolKind::Struct,
        "union" => SymbolKind::Union,
        "decorator" => SymbolKind::Decorator,
        _ => SymbolKind::Variable,
    }
}

fn edge_kind_from_str(s: &str) -> EdgeKind {
    match s {
        "call" => EdgeKind::Call,
        "import" => EdgeKind::Import,
        "implicit" => EdgeKind::Implicit,
        _ => EdgeKind::Call,
    }
}

impl SqliteGraphStore {
    /// Open or create a graph database at the given path.
    pub fn open(path: &str) -> Result<Self, GraphError> {
        let conn = Connection::open(path)?;
        let store = SqliteGraphStore { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory graph database (for testing).
    pub fn in_memory() -> Result<Self, GraphError> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteGraphStore { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), GraphError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS symbols (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN
                    ('function','method','class','interface','type','enum','variable','struct','union','decorator')),
                file_path TEXT NOT NULL,
                start_line INTEGER NOT NULL,
                start_column INTEGER NOT NULL,
                end_line INTEGER NOT NULL,
                end_column INTEGER NOT NULL,
                complexity INTEGER NOT NULL DEFAULT 1,
                domain TEXT,
                purpose TEXT,
                impact_depth INTEGER,
                search_tags TEXT,
                fragility REAL,
                risk_score REAL,
                risk_reason TEXT,
                UNIQUE (file_path, name, start_line)
            );
            CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name);
            CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file_path);
            CREATE INDEX IF NOT EXISTS idx_symbols_kind ON symbols(kind);
            CREATE INDEX IF NOT EXISTS idx_symbols_domain ON symbols(domain);

            CREATE TABLE IF NOT EXISTS edges (
                id INTEGER PRIMARY KEY,
                source_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
                target_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
                kind TEXT NOT NULL CHECK (kind IN ('call','import','implicit')),
                reason TEXT,
                UNIQUE (source_id, target_id, kind)
            );
            CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id);
            CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id);
            CREATE INDEX IF NOT EXISTS idx_edges_kind ON edges(kind);

            CREATE TABLE IF NOT EXISTS files (
                file_path TEXT PRIMARY KEY,
                content_hash TEXT NOT NULL,
                last_indexed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS ai_cache (
                hash TEXT PRIMARY KEY,
                response TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS technical_debt (
                id INTEGER PRIMARY KEY,
                symbol_id INTEGER REFERENCES symbols(id) ON DELETE CASCADE,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS domain_metadata (
                domain TEXT PRIMARY KEY,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS domain_cache (
                domain TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                cached_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;

        // Idempotent migration: add enrichment columns if an older schema
        // version created `symbols` without them. `ALTER TABLE ... ADD
        // COLUMN` errors when the column already exists, so failures are
        // swallowed — this mirrors the ADD-COLUMN-then-ignore pattern used
        // elsewhere in this codebase for additive schema changes.
        for (col, ddl) in [
            ("domain", "ALTER TABLE symbols ADD COLUMN domain TEXT"),
            ("purpose", "ALTER TABLE symbols ADD COLUMN purpose TEXT"),
            ("impact_depth", "ALTER TABLE symbols ADD COLUMN impact_depth INTEGER"),
            ("search_tags", "ALTER TABLE symbols ADD COLUMN search_tags TEXT"),
            ("fragility", "ALTER TABLE symbols ADD COLUMN fragility REAL"),
            ("risk_score", "ALTER TABLE symbols ADD COLUMN risk_score REAL"),
            ("risk_reason", "ALTER TABLE symbols ADD COLUMN risk_reason TEXT"),
        ] {
            if !self.column_exists("symbols", col) {
                let _ = self.conn.execute(ddl, []);
            }
        }
        let _ = self
            .conn
            .execute("CREATE INDEX IF NOT EXISTS idx_symbols_domain ON symbols(domain)", []);
        let _ = self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS technical_debt (
                id INTEGER PRIMARY KEY,
                symbol_id INTEGER REFERENCES symbols(id) ON DELETE CASCADE,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        );

        self.conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;

        Ok(())
    }

    fn column_exists(&self, table: &str, column: &str) -> bool {
        let mut stmt = match self.conn.prepare(&format!("PRAGMA table_info({table})")) {
            Ok(s) => s,
            Err(_) => return false,
        };
        stmt.query_map([], |row| row.get::<_, String>(1))
            .map(|rows| rows.filter_map(|r| r.ok()).any(|name| name == column))
            .unwrap_or(false)
    }

    /// Get the current schema version.
    pub fn schema_version(&self) -> Result<u32, GraphError> {
        let version: String = self.conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        version
            .parse()
            .map_err(|e| GraphError::Internal(format!("invalid schema version: {}", e)))
    }

    fn row_to_symbol(row: &rusqlite::Row) -> SqlResult<Symbol> {
        let kind_str: String = row.get("kind")?;
        Ok(Symbol {
            id: row.get("id")?,
            name: row.get("name")?,
            kind: symbol_kind_from_str(&kind_str),
            file_path: row.get("file_path")?,
            range: Range {
                start_line: row.get("start_line")?,
                start_column: row.get("start_column")?,
                end_line: row.get("end_line")?,
                end_column: row.get("end_column")?,
            },
            complexity: row.get("complexity")?,
        })
    }

    fn row_to_edge(row: &rusqlite::Row) -> SqlResult<Edge> {
        let kind_str: String = row.get("kind")?;
        Ok(Edge {
            id: row.get("id")?,
            source_id: row.get("source_id")?,
            target_id: row.get("target_id")?,
            kind: edge_kind_from_str(&kind_str),
            reason: row.get("reason")?,
        })
    }
}

impl GraphStore for SqliteGraphStore {
    fn get_symbol(&self, id: u64) -> Option<Symbol> {
        self.conn
            .query_row("SELECT * FROM symbols WHERE id = ?1", params![id], Self::row_to_symbol)
            .ok()
    }

    fn get_symbols_by_name(&self, name: &str) -> Vec<Symbol> {
        let mut stmt = match self.conn.prepare("SELECT * FROM symbols WHERE name = ?1") {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        stmt.query_map(params![name], Self::row_to_symbol)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn get_symbol_at(&self, file_path: &str, start_line: u32) -> Option<Symbol> {
        self.conn
            .query_row(
                "SELECT * FROM symbols WHERE file_path = ?1 AND start_line = ?2",
                params![file_path, start_line],
                Self::row_to_symbol,
            )
            .ok()
    }

    fn get_symbols_in_file(&self, file_path: &str) -> Vec<Symbol> {
        let mut stmt = match self.conn.prepare("SELECT * FROM symbols WHERE file_path = ?1") {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        stmt.query_map(params![file_path], Self::row_to_symbol)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn get_symbols_by_domain(&self, domain: &str) -> Vec<Symbol> {
        let mut stmt = match self.conn.prepare("SELECT * FROM symbols WHERE domain = ?1") {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        stmt.query_map(params![domain], Self::row_to_symbol)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn get_edges(&self, symbol_id: u64, direction: EdgeDirection) -> Vec<Edge> {
        let query = match direction {
            EdgeDirection::Incoming => "SELECT * FROM edges WHERE target_id = ?1",
            EdgeDirection::Outgoing => "SELECT * FROM edges WHERE source_id = ?1",
            EdgeDirection::Both => "SELECT * FROM edges WHERE source_id = ?1 OR target_id = ?1",
        };
        let mut stmt = match self.conn.prepare(query) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        stmt.query_map(params![symbol_id], Self::row_to_edge)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn file_edge_counts(&self, file_path: &str) -> Vec<(String, u32)> {
        let mut stmt = match self.conn.prepare(
            "SELECT t.file_path, COUNT(*) as c
             FROM edges e
             JOIN symbols s ON s.id = e.source_id
             JOIN symbols t ON t.id = e.target_id
             WHERE e.kind = 'import' AND s.file_path = ?1 AND t.file_path != ?1
             GROUP BY t.file_path",
        ) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        stmt.query_map(params![file_path], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })
        .map(|rows| rows.filter_map(|r| r.ok()).collect())
        .unwrap_or_default()
    }

    fn domain_edge_counts(&self, domain: &str) -> (u32, u32) {
        let total: u32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM edges e
                 JOIN symbols s ON s.id = e.source_id OR s.id = e.target_id
                 WHERE s.domain = ?1",
                params![domain],
                |row| row.get(0),
            )
            .unwrap_or(0);
        let cross: u32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM edges e
                 JOIN symbols s ON s.id = e.source_id
                 JOIN symbols t ON t.id = e.target_id
                 WHERE s.domain = ?1 AND (t.domain IS NULL OR t.domain != ?1)",
                params![domain],
                |row| row.get(0),
            )
            .unwrap_or(0);
        (cross, total)
    }

    fn insert_symbols(&mut self, symbols: &[Symbol]) -> Result<Vec<u64>, GraphError> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(symbols.len());
        for sym in symbols {
            tx.execute(
                "INSERT INTO symbols
                    (name, kind, file_path, start_line, start_column, end_line, end_column, complexity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (file_path, name, start_line) DO UPDATE SET
                    kind = excluded.kind,
                    start_column = excluded.start_column,
                    end_line = excluded.end_line,
                    end_column = excluded.end_column,
                    complexity = excluded.complexity",
                params![
                    sym.name,
                    sym.kind.as_str(),
                    sym.file_path,
                    sym.range.start_line,
                    sym.range.start_column,
                    sym.range.end_line,
                    sym.range.end_column,
                    sym.complexity,
                ],
            )?;
            let id: u64 = tx.query_row(
                "SELECT id FROM symbols WHERE file_path = ?1 AND name = ?2 AND start_line = ?3",
                params![sym.file_path, sym.name, sym.range.start_line],
                |row| row.get(0),
            )?;
            ids.push(id);
        }
        tx.commit()?;
        Ok(ids)
    }

    fn insert_edges(&mut self, edges: &[Edge]) -> Result<(), GraphError> {
        let tx = self.conn.transaction()?;
        for edge in edges {
            if edge.source_id == 0 || edge.target_id == 0 {
                continue;
            }
            tx.execute(
                "INSERT OR IGNORE INTO edges (source_id, target_id, kind, reason) VALUES (?1, ?2, ?3, ?4)",
                params![edge.source_id, edge.target_id, edge.kind.as_str(), edge.reason],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert_edge_batch(&mut self, pairs: &[(u64, u64)], kind: EdgeKind) -> Result<(), GraphError> {
        let tx = self.conn.transaction()?;
        for (source_id, target_id) in pairs {
            if source_id == target_id || *source_id == 0 || *target_id == 0 {
                continue;
            }
            tx.execute(
                "INSERT OR IGNORE INTO edges (source_id, target_id, kind) VALUES (?1, ?2, ?3)",
                params![source_id, target_id, kind.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_symbols_by_file(&mut self, file_path: &str) -> Result<(), GraphError> {
        self.conn
            .execute("DELETE FROM symbols WHERE file_path = ?1", params![file_path])?;
        Ok(())
    }

    fn get_file_hash(&self, file_path: &str) -> Option<String> {
        self.conn
            .query_row(
                "SELECT content_hash FROM files WHERE file_path = ?1",
                params![file_path],
                |row| row.get(0),
            )
            .optional()
            .ok()
            .flatten()
    }

    fn set_file_hash(&mut self, file: &IndexedFile) -> Result<(), GraphError> {
        self.conn.execute(
            "INSERT INTO files (file_path, content_hash, last_indexed_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (file_path) DO UPDATE SET content_hash = excluded.content_hash, last_indexed_at = excluded.last_indexed_at",
            params![file.file_path, file.content_hash, file.last_indexed_at],
        )?;
        Ok(())
    }

    fn get_enrichment(&self, symbol_id: u64) -> Option<SymbolEnrichment> {
        self.conn
            .query_row(
                "SELECT domain, purpose, impact_depth, search_tags, fragility, risk_score, risk_reason
                 FROM symbols WHERE id = ?1",
                params![symbol_id],
                |row| {
                    let search_tags: Option<String> = row.get(3)?;
                    Ok(SymbolEnrichment {
                        domain: row.get(0)?,
                        purpose: row.get(1)?,
                        impact_depth: row.get(2)?,
                        search_tags: search_tags
                            .and_then(|s| serde_json::from_str(&s).ok()),
                        fragility: row.get(4)?,
                        risk_score: row.get(5)?,
                        risk_reason: row.get(6)?,
                    })
                },
            )
            .ok()
    }

    fn set_enrichment(&mut self, symbol_id: u64, enrichment: &SymbolEnrichment) -> Result<(), GraphError> {
        let tags = enrichment
            .search_tags
            .as_ref()
            .map(|v| serde_json::to_string(v).unwrap_or_default());
        self.conn.execute(
            "UPDATE symbols SET domain = ?1, purpose = ?2, impact_depth = ?3, search_tags = ?4,
                fragility = ?5, risk_score = ?6, risk_reason = ?7 WHERE id = ?8",
            params![
                enrichment.domain,
                enrichment.purpose,
                enrichment.impact_depth,
                tags,
                enrichment.fragility,
                enrichment.risk_score,
                enrichment.risk_reason,
                symbol_id,
            ],
        )?;
        Ok(())
    }

    fn get_ai_cache(&self, hash: &str) -> Option<String> {
        self.conn
            .query_row("SELECT response FROM ai_cache WHERE hash = ?1", params![hash], |row| {
                row.get(0)
            })
            .optional()
            .ok()
            .flatten()
    }

    fn set_ai_cache(&mut self, hash: &str, response: &str) -> Result<(), GraphError> {
        self.conn.execute(
            "INSERT INTO ai_cache (hash, response) VALUES (?1, ?2)
             ON CONFLICT (hash) DO UPDATE SET response = excluded.response, created_at = datetime('now')",
            params![hash, response],
        )?;
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Option<String> {
        self.conn
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .ok()
            .flatten()
    }

    fn set_meta(&mut self, key: &str, value: &str) -> Result<(), GraphError> {
        self.conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn export_graph(&self) -> (Vec<Symbol>, Vec<Edge>) {
        let symbols = self
            .conn
            .prepare("SELECT * FROM symbols")
            .and_then(|mut stmt| {
                let rows = stmt.query_map([], Self::row_to_symbol)?;
                Ok(rows.filter_map(|r| r.ok()).collect::<Vec<_>>())
            })
            .unwrap_or_default();
        let edges = self
            .conn
            .prepare("SELECT * FROM edges")
            .and_then(|mut stmt| {
                let rows = stmt.query_map([], Self::row_to_edge)?;
                Ok(rows.filter_map(|r| r.ok()).collect::<Vec<_>>())
            })
            .unwrap_or_default();
        (symbols, edges)
    }

    fn clear(&mut self) -> Result<(), GraphError> {
        self.conn.execute_batch(
            "DELETE FROM edges; DELETE FROM symbols; DELETE FROM files;
             DELETE FROM meta WHERE key != 'schema_version';
             DELETE FROM ai_cache; DELETE FROM technical_debt;
             DELETE FROM domain_metadata; DELETE FROM domain_cache;",
        )?;
        Ok(())
    }

    fn stats(&self) -> (u64, u64, u64) {
        let symbols: u64 = self.conn.query_row("SELECT COUNT(*) FROM symbols", [], |r| r.get(0)).unwrap_or(0);
        let edges: u64 = self.conn.query_row("SELECT COUNT(*) FROM edges", [], |r| r.get(0)).unwrap_or(0);
        let files: u64 = self.conn.query_row("SELECT COUNT(*) FROM files", [], |r| r.get(0)).unwrap_or(0);
        (symbols, edges, files)
    }

    fn workspace_root(&self) -> String {
        crate::paths::find_common_prefix(&self.all_file_paths())
    }

    fn all_file_paths(&self) -> Vec<String> {
        self.conn
            .prepare("SELECT file_path FROM files")
            .and_then(|mut stmt| {
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                Ok(rows.filter_map(|r| r.ok()).collect::<Vec<_>>())
            })
            .unwrap_or_default()
    }

    fn pre_index_cleanup(&mut self) -> Result<(), GraphError> {
        crate::sqlite_bulk::pre_index_cleanup(self)
    }

    fn post_index_optimization(&mut self) -> Result<(), GraphError> {
        crate::sqlite_bulk::post_index_optimization(self)
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
