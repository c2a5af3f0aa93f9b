//! Directory entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A directory in the wiki hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Directory {
    /// Unique directory identifier.
    pub id: i64,
    /// Sanitized display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Parent directory ID (null for root-level directories).
    pub parent_id: Option<i64>,
    /// Full materialized path (e.g., `/guides/setup`).
    pub path: String,
    /// Display order among siblings.
    pub sort_order: i32,
    /// When the directory was created.
    pub created_at: DateTime<Utc>,
    /// When the directory was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Directory {
    /// Check if this directory sits at the root level (no parent).
    pub fn is_root_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new directory.
///
/// `name` must already be sanitized and `path` computed from the parent
/// chain; the orchestrator owns both steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDirectory {
    /// Sanitized directory name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent directory (None for root-level).
    pub parent_id: Option<i64>,
    /// Full materialized path.
    pub path: String,
    /// Display order among siblings.
    pub sort_order: i32,
}

/// Which parent a directory update targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentUpdate {
    /// Leave the parent unchanged.
    #[default]
    Keep,
    /// Re-parent to the root level.
    Root,
    /// Re-parent under the given directory.
    To(i64),
}

/// Partial update of a directory. Absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateDirectory {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New parent.
    pub parent: ParentUpdate,
    /// New display order.
    pub sort_order: Option<i32>,
}

/// A single row of a cascading path rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathUpdate {
    /// Directory to rewrite.
    pub id: i64,
    /// The path it receives.
    pub new_path: String,
}

/// Old and new path of a directory affected by a move or rename.
///
/// Returned to callers so external references (documents, bookmarks) can
/// be reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathChange {
    /// Affected directory.
    pub id: i64,
    /// Path before the operation.
    pub old_path: String,
    /// Path after the operation.
    pub new_path: String,
}

/// Result of a move operation: the relocated directory plus the path
/// change of every affected descendant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The moved directory in its committed state.
    pub directory: Directory,
    /// Path rewrites applied to descendants, ancestors first.
    pub changes: Vec<PathChange>,
}

/// Delete-safety report for a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteStatus {
    /// Whether the directory may be deleted.
    pub can_delete: bool,
    /// Whether direct child directories exist.
    pub has_children: bool,
    /// Whether documents are attached directly.
    pub has_documents: bool,
    /// Number of direct child directories.
    pub children_count: u64,
    /// Number of directly attached documents.
    pub document_count: u64,
    /// Documents attached anywhere in the subtree, this directory included.
    pub total_document_count: u64,
    /// Human-readable reasons the delete is refused or risky.
    pub warnings: Vec<String>,
}

impl DeleteStatus {
    /// Evaluate delete safety from raw counts.
    ///
    /// Only *direct* children and *direct* documents block deletion; the
    /// subtree total is informational (a directory without children cannot
    /// hold descendant documents).
    pub fn evaluate(children_count: u64, document_count: u64, total_document_count: u64) -> Self {
        let has_children = children_count > 0;
        let has_documents = document_count > 0;

        let mut warnings = Vec::new();
        if has_children {
            warnings.push(format!(
                "Directory contains {children_count} child directorie(s); move or delete them first"
            ));
        }
        if has_documents {
            warnings.push(format!(
                "Directory contains {document_count} document(s); move or delete them first"
            ));
        }
        if total_document_count > document_count {
            warnings.push(format!(
                "{total_document_count} document(s) are attached across the subtree"
            ));
        }

        Self {
            can_delete: !has_children && !has_documents,
            has_children,
            has_documents,
            children_count,
            document_count,
            total_document_count,
            warnings,
        }
    }
}

/// Aggregate statistics over the whole directory tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryStats {
    /// Total number of directories.
    pub total_directories: u64,
    /// Number of root-level directories.
    pub root_directories: u64,
    /// Deepest nesting level present (0 when the tree is empty).
    pub max_depth: u64,
    /// Total number of documents across all directories.
    pub total_documents: u64,
}
