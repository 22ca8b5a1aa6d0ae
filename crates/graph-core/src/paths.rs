//! Path helpers shared by the store's workspace-root heuristic and the
//! architecture skeleton builder in `graph-engine`.

/// Longest common path prefix of `paths`, split on `/`. Returns `"/"` for
/// an empty or maximally-divergent set (spec.md §9c) — callers then treat
/// every file as a root-level file node rather than special-casing it.
pub fn find_common_prefix(paths: &[String]) -> String {
    if paths.is_empty() {
        return "/".to_string();
    }
    let mut segments: Vec<&str> = paths[0].split('/').collect();
    for path in &paths[1..] {
        let other: Vec<&str> = path.split('/').collect();
        let common_len = segments
            .iter()
            .zip(other.iter())
            .take_while(|(a, b)| a == b)
            .count();
        segments.truncate(common_len);
        if segments.is_empty() {
            return "/".to_string();
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefix_of_sibling_files() {
        let paths = vec!["src/db/a.ts".to_string(), "src/db/b.ts".to_string()];
        assert_eq!(find_common_prefix(&paths), "src/db");
    }

    #[test]
    fn test_common_prefix_diverging_roots_returns_slash() {
        let paths = vec!["src/a.ts".to_string(), "lib/b.ts".to_string()];
        assert_eq!(find_common_prefix(&paths), "/");
    }

    #[test]
    fn test_common_prefix_empty_input_returns_slash() {
        assert_eq!(find_common_prefix(&[]), "/");
    }

    #[test]
    fn test_common_prefix_single_file_is_its_own_directory() {
        let paths = vec!["src/app/main.ts".to_string()];
        assert_eq!(find_common_prefix(&paths), "src/app/main.ts");
    }
}
