//! Workspace file discovery for the dev-harness CLI. Not part of the core
//! engine (spec.md §1 routes file discovery to an external collaborator);
//! grounded on `keel-parsers/src/walker.rs::FileWalker`, rescoped to the
//! languages this indexer actually supports.

use std::path::{Path, PathBuf};

use graph_core::types::Language;
use ignore::WalkBuilder;

pub struct WalkEntry {
    pub path: PathBuf,
    pub language: Language,
}

pub struct FileWalker {
    root: PathBuf,
}

impl FileWalker {
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf() }
    }

    /// Walks the root directory and returns every file whose extension
    /// maps to a supported language, respecting `.gitignore`.
    pub fn walk(&self) -> Vec<WalkEntry> {
        let mut entries = Vec::new();
        let walker = WalkBuilder::new(&self.root).hidden(true).git_ignore(true).git_global(false).build();

        for result in walker {
            let Ok(entry) = result else { continue };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.into_path();
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else { continue };
            if let Some(language) = Language::from_extension(ext) {
                entries.push(WalkEntry { path, language });
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_walk_finds_supported_files_and_skips_others() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "function f() {}").unwrap();
        fs::write(dir.path().join("README.md"), "hello").unwrap();

        let walker = FileWalker::new(dir.path());
        let entries = walker.walk();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].language, Language::Typescript);
    }
}
