//! Configuration file loading for the indexer.
//!
//! Reads `.codegraph/config.json` and provides typed access to all
//! settings. Falls back to sensible defaults when the config file is
//! missing or incomplete.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level indexer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub version: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub bulk_ingest: BulkIngestConfig,
    #[serde(default = "default_memory_ceiling_mb")]
    pub memory_ceiling_mb: u32,
    #[serde(default = "default_blast_radius_max_depth")]
    pub blast_radius_max_depth: u32,
}

/// Bulk-ingest tuning knobs (spec.md §4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkIngestConfig {
    #[serde(default = "default_page_cache_kb")]
    pub page_cache_kb: u32,
}

fn default_languages() -> Vec<String> {
    vec!["typescript".to_string(), "python".to_string(), "c".to_string()]
}
fn default_memory_ceiling_mb() -> u32 {
    512
}
fn default_blast_radius_max_depth() -> u32 {
    5
}
fn default_page_cache_kb() -> u32 {
    65536
}

impl Default for BulkIngestConfig {
    fn default() -> Self {
        Self {
            page_cache_kb: default_page_cache_kb(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            languages: default_languages(),
            ignore_patterns: vec![],
            bulk_ingest: BulkIngestConfig::default(),
            memory_ceiling_mb: default_memory_ceiling_mb(),
            blast_radius_max_depth: default_blast_radius_max_depth(),
        }
    }
}

impl GraphConfig {
    /// Load configuration from `.codegraph/config.json` inside the given
    /// project directory. Returns defaults if the file doesn't exist or
    /// can't be parsed.
    pub fn load(project_dir: &Path) -> Self {
        let config_path = project_dir.join(".codegraph").join("config.json");
        let content = match std::fs::read_to_string(&config_path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!(
                    "[graph-core] warning: failed to parse {}: {}, using defaults",
                    config_path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let cfg = GraphConfig::default();
        assert_eq!(cfg.memory_ceiling_mb, 512);
        assert_eq!(cfg.blast_radius_max_depth, 5);
        assert_eq!(cfg.bulk_ingest.page_cache_kb, 65536);
        assert_eq!(cfg.languages, vec!["typescript", "python", "c"]);
    }

    #[test]
    fn test_roundtrip_all_non_default_values() {
        let original = GraphConfig {
            version: "9.9.9".to_string(),
            languages: vec!["python".to_string()],
            ignore_patterns: vec!["vendor/**".to_string()],
            bulk_ingest: BulkIngestConfig { page_cache_kb: 131072 },
            memory_ceiling_mb: 1024,
            blast_radius_max_depth: 8,
        };
        let json = serde_json::to_string_pretty(&original).unwrap();
        let roundtripped: GraphConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(original, roundtripped);
    }

    #[test]
    fn test_load_missing_file() {
        let cfg = GraphConfig::load(Path::new("/nonexistent"));
        assert_eq!(cfg.memory_ceiling_mb, 512);
    }

    #[test]
    fn test_load_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".codegraph")).unwrap();
        let config = serde_json::json!({
            "version": "0.2.0",
            "languages": ["typescript"],
            "memory_ceiling_mb": 256
        });
        fs::write(dir.path().join(".codegraph").join("config.json"), config.to_string()).unwrap();
        let cfg = GraphConfig::load(dir.path());
        assert_eq!(cfg.version, "0.2.0");
        assert_eq!(cfg.memory_ceiling_mb, 256);
        assert_eq!(cfg.blast_radius_max_depth, 5); // default
    }

    #[test]
    fn test_load_malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".codegraph")).unwrap();
        fs::write(dir.path().join(".codegraph").join("config.json"), "{not json").unwrap();
        let cfg = GraphConfig::load(dir.path());
        assert_eq!(cfg, GraphConfig::default());
    }
}
