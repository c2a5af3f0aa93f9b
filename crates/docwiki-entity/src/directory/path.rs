//! Materialized-path algebra for the directory tree.
//!
//! Paths encode the full ancestor chain as a string (`/guides/setup`),
//! which turns ancestor/descendant queries and cycle checks into string
//! prefix comparisons instead of pointer walks. All functions are pure
//! and total over well-formed paths.

use serde::{Deserialize, Serialize};

use super::name::sanitize_name;

/// The synthetic root path. No directory row carries it.
pub const ROOT_PATH: &str = "/";

/// One segment of a parsed path, with the cumulative path up to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    /// Segment name.
    pub name: String,
    /// Materialized path ending at this segment.
    pub path: String,
    /// Nesting level (direct children of the root are level 1).
    pub level: usize,
}

/// Compute the materialized path of a directory under `parent_path`.
///
/// The name is sanitized; a trailing slash on the parent path is ignored.
pub fn build_path(parent_path: Option<&str>, name: &str) -> String {
    let clean = sanitize_name(name);
    match parent_path {
        None => format!("/{clean}"),
        Some(parent) => {
            let trimmed = parent.trim_end_matches('/');
            if trimmed.is_empty() {
                format!("/{clean}")
            } else {
                format!("{trimmed}/{clean}")
            }
        }
    }
}

/// Number of segments in a path. The root is level 0.
pub fn level(path: &str) -> usize {
    if path == ROOT_PATH || path.is_empty() {
        return 0;
    }
    path.trim_matches('/').split('/').count()
}

/// The path with its last segment removed; `"/"` for top-level nodes.
pub fn parent_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        None | Some(0) => ROOT_PATH.to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Every proper prefix path of `path`, from `"/"` up to (excluding) the
/// path itself, root-to-leaf order. The root itself has no ancestors.
pub fn ancestor_paths(path: &str) -> Vec<String> {
    if path == ROOT_PATH || path.is_empty() {
        return Vec::new();
    }
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let mut ancestors = Vec::with_capacity(segments.len());
    ancestors.push(ROOT_PATH.to_string());
    let mut acc = String::new();
    for segment in &segments[..segments.len() - 1] {
        acc.push('/');
        acc.push_str(segment);
        ancestors.push(acc.clone());
    }
    ancestors
}

/// The prefix matching any path strictly nested under `path`.
///
/// The root's prefix is `"/"` itself, which matches every directory.
pub fn descendant_prefix(path: &str) -> String {
    if path == ROOT_PATH {
        ROOT_PATH.to_string()
    } else {
        format!("{path}/")
    }
}

/// Whether `path` lies strictly inside the subtree rooted at
/// `ancestor_path` (any depth).
pub fn is_child_of(path: &str, ancestor_path: &str) -> bool {
    path != ancestor_path && path.starts_with(&descendant_prefix(ancestor_path))
}

/// Whether `path` is an immediate child of `ancestor_path`.
pub fn is_direct_child_of(path: &str, ancestor_path: &str) -> bool {
    is_child_of(path, ancestor_path) && level(path) == level(ancestor_path) + 1
}

/// Whether re-parenting the directory at `subject_path` under
/// `candidate_parent_path` would make it its own ancestor.
///
/// True iff the candidate is the subject itself or lies inside the
/// subject's subtree.
pub fn would_create_cycle(subject_path: &str, candidate_parent_path: &str) -> bool {
    candidate_parent_path == subject_path || is_child_of(candidate_parent_path, subject_path)
}

/// Decompose a path into its segment chain, cumulative paths included.
///
/// Used for breadcrumb reconstruction without hitting storage.
pub fn parse_path_info(path: &str) -> Vec<PathSegment> {
    if path == ROOT_PATH || path.is_empty() {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut acc = String::new();
    for (idx, name) in path.trim_matches('/').split('/').enumerate() {
        acc.push('/');
        acc.push_str(name);
        segments.push(PathSegment {
            name: name.to_string(),
            path: acc.clone(),
            level: idx + 1,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_path_root_level() {
        assert_eq!(build_path(None, "Docs"), "/Docs");
        assert_eq!(build_path(Some("/"), "Docs"), "/Docs");
    }

    #[test]
    fn test_build_path_nested() {
        assert_eq!(build_path(Some("/Docs"), "Guides"), "/Docs/Guides");
        assert_eq!(build_path(Some("/Docs/"), "Guides"), "/Docs/Guides");
    }

    #[test]
    fn test_build_path_sanitizes_name() {
        assert_eq!(build_path(Some("/Docs"), "  a/b  "), "/Docs/ab");
    }

    #[test]
    fn test_level() {
        assert_eq!(level("/"), 0);
        assert_eq!(level("/a"), 1);
        assert_eq!(level("/a/b/c"), 3);
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/a/b/c"), "/a/b");
        assert_eq!(parent_path("/a"), "/");
        assert_eq!(parent_path("/"), "/");
    }

    #[test]
    fn test_ancestor_paths() {
        assert_eq!(ancestor_paths("/a/b/c"), vec!["/", "/a", "/a/b"]);
        assert_eq!(ancestor_paths("/a"), vec!["/"]);
        assert!(ancestor_paths("/").is_empty());
    }

    #[test]
    fn test_ancestors_reconstruct_parse_chain() {
        let path = "/wiki/guides/setup";
        let ancestors = ancestor_paths(path);
        let parsed = parse_path_info(path);
        let chain: Vec<&str> = ancestors[1..]
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(path))
            .collect();
        let parsed_paths: Vec<&str> = parsed.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(chain, parsed_paths);
    }

    #[test]
    fn test_descendant_prefix() {
        assert_eq!(descendant_prefix("/a"), "/a/");
        assert_eq!(descendant_prefix("/"), "/");
    }

    #[test]
    fn test_is_child_of() {
        assert!(is_child_of("/a/b", "/a"));
        assert!(is_child_of("/a/b/c", "/a"));
        assert!(!is_child_of("/a", "/a"));
        assert!(!is_child_of("/ab", "/a"));
        assert!(is_child_of("/a", "/"));
    }

    #[test]
    fn test_is_direct_child_of() {
        assert!(is_direct_child_of("/a/b", "/a"));
        assert!(!is_direct_child_of("/a/b/c", "/a"));
        assert!(is_direct_child_of("/a", "/"));
    }

    #[test]
    fn test_would_create_cycle() {
        assert!(would_create_cycle("/a", "/a"));
        assert!(would_create_cycle("/a", "/a/b"));
        assert!(would_create_cycle("/a", "/a/b/c"));
        assert!(!would_create_cycle("/a", "/b"));
        assert!(!would_create_cycle("/a/b", "/a"));
        assert!(!would_create_cycle("/a", "/ab"));
    }

    #[test]
    fn test_cycle_matches_child_relation() {
        let subject = "/x/y";
        for candidate in ["/x/y", "/x/y/z", "/x", "/x/z", "/"] {
            assert_eq!(
                would_create_cycle(subject, candidate),
                candidate == subject || is_child_of(candidate, subject),
                "mismatch for {candidate:?}"
            );
        }
    }

    #[test]
    fn test_parse_path_info() {
        let segments = parse_path_info("/a/b");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].name, "a");
        assert_eq!(segments[0].path, "/a");
        assert_eq!(segments[0].level, 1);
        assert_eq!(segments[1].name, "b");
        assert_eq!(segments[1].path, "/a/b");
        assert_eq!(segments[1].level, 2);
        assert!(parse_path_info("/").is_empty());
    }
}
