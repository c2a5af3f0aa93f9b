//! The persistence contract of the directory subsystem.

use std::collections::HashMap;

use async_trait::async_trait;

use docwiki_core::result::AppResult;
use docwiki_core::types::{PageRequest, PageResponse};
use docwiki_entity::directory::{
    CreateDirectory, DeleteStatus, Directory, DirectoryFilter, DirectorySort, DirectoryStats,
    PathUpdate,
};

/// Persistence operations over the directory table.
///
/// Implementations must guarantee atomicity of the multi-row methods:
/// `update_paths`, `update_with_paths`, and `reorder_siblings` either
/// apply every listed write or none. Two implementations are provided:
/// - PostgreSQL (explicit transactions)
/// - In-memory (validate-then-apply under a `tokio::sync::Mutex`)
#[async_trait]
pub trait DirectoryStore: Send + Sync + 'static {
    /// Insert one directory and return the stored record.
    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory>;

    /// Find a directory by ID.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Directory>>;

    /// Find a directory by its materialized path.
    async fn find_by_path(&self, path: &str) -> AppResult<Option<Directory>>;

    /// Whether a directory with this ID exists.
    async fn exists(&self, id: i64) -> AppResult<bool>;

    /// Whether any directory other than `exclude_id` occupies `path`.
    async fn path_exists(&self, path: &str, exclude_id: Option<i64>) -> AppResult<bool>;

    /// Direct children of a parent (`None` = root level), sorted.
    async fn find_by_parent(
        &self,
        parent_id: Option<i64>,
        sort: &DirectorySort,
    ) -> AppResult<Vec<Directory>>;

    /// Paginated, filtered, sorted listing.
    async fn list(
        &self,
        filter: &DirectoryFilter,
        sort: &DirectorySort,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Directory>>;

    /// Unpaged filtered listing, used for tree assembly.
    async fn find_all(
        &self,
        filter: &DirectoryFilter,
        sort: &DirectorySort,
    ) -> AppResult<Vec<Directory>>;

    /// Every directory strictly inside the subtree of `id`, ordered by
    /// path so ancestors precede their descendants.
    async fn get_descendants(&self, id: i64) -> AppResult<Vec<Directory>>;

    /// The ancestor chain of `id`, root-to-leaf order.
    async fn get_ancestors(&self, id: i64) -> AppResult<Vec<Directory>>;

    /// Update a single directory row.
    async fn update(&self, directory: &Directory) -> AppResult<Directory>;

    /// Rewrite `path` (and `updated_at`) for every listed row as one
    /// atomic transaction.
    async fn update_paths(&self, updates: &[PathUpdate]) -> AppResult<()>;

    /// Update a directory row and apply a descendant path cascade in the
    /// same transaction.
    async fn update_with_paths(
        &self,
        directory: &Directory,
        cascade: &[PathUpdate],
    ) -> AppResult<Directory>;

    /// One more than the current maximum `sort_order` among siblings
    /// (0 when the parent has no children).
    async fn next_sort_order(&self, parent_id: Option<i64>) -> AppResult<i32>;

    /// Assign `sort_order = index` for each ID under the given parent,
    /// as one atomic transaction. Fails (and rolls back) if any ID no
    /// longer belongs to the parent.
    async fn reorder_siblings(&self, parent_id: Option<i64>, ordered_ids: &[i64])
    -> AppResult<()>;

    /// Delete a single directory row. Returns `true` if a row was removed.
    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Documents attached directly to a directory (delegated to the
    /// external documents collaborator).
    async fn document_count(&self, id: i64) -> AppResult<u64>;

    /// Batch document counts; directories without documents are absent
    /// from the result map.
    async fn document_counts(&self, ids: &[i64]) -> AppResult<HashMap<i64, u64>>;

    /// Aggregate the delete-safety report for a directory.
    async fn delete_status(&self, id: i64) -> AppResult<DeleteStatus>;

    /// Aggregate statistics over the whole tree.
    async fn stats(&self) -> AppResult<DirectoryStats>;
}
