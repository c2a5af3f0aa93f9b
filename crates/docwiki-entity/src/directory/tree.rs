//! Tree assembly from a flat directory listing.
//!
//! The tree is never modeled as a pointer graph: a parent-id index is
//! built once per call and discarded, so assembly stays O(n) over the
//! row count and free of ownership cycles.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::Directory;
use super::path;

/// A directory with its children attached, ready for hierarchical display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Directory ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent directory ID.
    pub parent_id: Option<i64>,
    /// Full materialized path.
    pub path: String,
    /// Display order among siblings.
    pub sort_order: i32,
    /// Nesting level (direct children of the root are level 1).
    pub level: usize,
    /// Documents attached directly to this directory.
    pub document_count: u64,
    /// Documents attached anywhere in this subtree.
    pub total_document_count: u64,
    /// When the directory was created.
    pub created_at: DateTime<Utc>,
    /// When the directory was last updated.
    pub updated_at: DateTime<Utc>,
    /// Child nodes, ordered by `sort_order`.
    pub children: Vec<DirectoryNode>,
}

/// Assemble the whole forest from a flat directory list.
///
/// Roots are the rows with no parent; siblings are ordered by
/// `sort_order` ascending with `id` as tiebreak. `document_counts` maps
/// directory id to its directly-attached document count (absent = 0);
/// `total_document_count` aggregates bottom-up.
pub fn build_tree(
    directories: &[Directory],
    document_counts: &HashMap<i64, u64>,
) -> Vec<DirectoryNode> {
    let by_parent = index_by_parent(directories);
    by_parent
        .get(&None)
        .map(|roots| {
            roots
                .iter()
                .map(|dir| assemble(dir, &by_parent, document_counts))
                .collect()
        })
        .unwrap_or_default()
}

/// Assemble a single subtree from its root row and flat descendant list.
pub fn build_subtree(
    root: &Directory,
    descendants: &[Directory],
    document_counts: &HashMap<i64, u64>,
) -> DirectoryNode {
    let by_parent = index_by_parent(descendants);
    assemble(root, &by_parent, document_counts)
}

fn index_by_parent(directories: &[Directory]) -> HashMap<Option<i64>, Vec<&Directory>> {
    let mut by_parent: HashMap<Option<i64>, Vec<&Directory>> = HashMap::new();
    for dir in directories {
        by_parent.entry(dir.parent_id).or_default().push(dir);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
    }
    by_parent
}

fn assemble(
    dir: &Directory,
    by_parent: &HashMap<Option<i64>, Vec<&Directory>>,
    document_counts: &HashMap<i64, u64>,
) -> DirectoryNode {
    let children: Vec<DirectoryNode> = by_parent
        .get(&Some(dir.id))
        .map(|rows| {
            rows.iter()
                .map(|child| assemble(child, by_parent, document_counts))
                .collect()
        })
        .unwrap_or_default();

    let document_count = document_counts.get(&dir.id).copied().unwrap_or(0);
    let total_document_count = document_count
        + children
            .iter()
            .map(|c| c.total_document_count)
            .sum::<u64>();

    DirectoryNode {
        id: dir.id,
        name: dir.name.clone(),
        description: dir.description.clone(),
        parent_id: dir.parent_id,
        path: dir.path.clone(),
        sort_order: dir.sort_order,
        level: path::level(&dir.path),
        document_count,
        total_document_count,
        created_at: dir.created_at,
        updated_at: dir.updated_at,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(id: i64, parent_id: Option<i64>, path: &str, sort_order: i32) -> Directory {
        let now = Utc::now();
        Directory {
            id,
            name: path.rsplit('/').next().unwrap_or_default().to_string(),
            description: None,
            parent_id,
            path: path.to_string(),
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    fn counts(pairs: &[(i64, u64)]) -> HashMap<i64, u64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_empty_input_builds_empty_forest() {
        assert!(build_tree(&[], &HashMap::new()).is_empty());
    }

    #[test]
    fn test_nesting_follows_parent_ids() {
        let rows = vec![
            dir(1, None, "/a", 0),
            dir(2, Some(1), "/a/b", 0),
            dir(3, Some(2), "/a/b/c", 0),
            dir(4, None, "/d", 1),
        ];
        let tree = build_tree(&rows, &HashMap::new());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children[0].id, 3);
        assert_eq!(tree[0].children[0].children[0].level, 3);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_siblings_ordered_by_sort_order() {
        let rows = vec![
            dir(1, None, "/b", 2),
            dir(2, None, "/a", 0),
            dir(3, None, "/c", 1),
        ];
        let tree = build_tree(&rows, &HashMap::new());
        let ids: Vec<i64> = tree.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_document_totals_aggregate_bottom_up() {
        let rows = vec![
            dir(1, None, "/a", 0),
            dir(2, Some(1), "/a/b", 0),
            dir(3, Some(1), "/a/c", 1),
            dir(4, Some(2), "/a/b/d", 0),
        ];
        let tree = build_tree(&rows, &counts(&[(1, 1), (2, 2), (4, 5)]));
        let root = &tree[0];
        assert_eq!(root.document_count, 1);
        assert_eq!(root.total_document_count, 8);
        assert_eq!(root.children[0].total_document_count, 7);
        assert_eq!(root.children[1].total_document_count, 0);
    }

    #[test]
    fn test_total_invariant_holds_everywhere() {
        fn check(node: &DirectoryNode) {
            let child_sum: u64 = node.children.iter().map(|c| c.total_document_count).sum();
            assert_eq!(node.total_document_count, node.document_count + child_sum);
            node.children.iter().for_each(check);
        }
        let rows = vec![
            dir(1, None, "/a", 0),
            dir(2, Some(1), "/a/b", 0),
            dir(3, Some(2), "/a/b/c", 0),
            dir(4, Some(1), "/a/d", 1),
        ];
        build_tree(&rows, &counts(&[(1, 3), (3, 4), (4, 1)]))
            .iter()
            .for_each(check);
    }

    #[test]
    fn test_build_subtree_keeps_root_with_foreign_parent() {
        let root = dir(2, Some(1), "/a/b", 0);
        let descendants = vec![dir(3, Some(2), "/a/b/c", 0)];
        let node = build_subtree(&root, &descendants, &counts(&[(3, 2)]));
        assert_eq!(node.id, 2);
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.total_document_count, 2);
    }
}
