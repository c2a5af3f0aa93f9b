//! In-memory directory store using a Tokio mutex for single-node use.
//!
//! Backs local development and the service test-suite. Batch operations
//! validate every row before touching state, so under the single lock
//! they are atomic exactly like the PostgreSQL transactions.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use docwiki_core::error::AppError;
use docwiki_core::result::AppResult;
use docwiki_core::types::{PageRequest, PageResponse, SortDirection};
use docwiki_entity::directory::path as path_algebra;
use docwiki_entity::directory::{
    CreateDirectory, DeleteStatus, Directory, DirectoryFilter, DirectorySort, DirectorySortKey,
    DirectoryStats, ParentFilter, PathUpdate,
};

use crate::store::DirectoryStore;

/// Internal state of the in-memory store.
#[derive(Debug, Default)]
struct InnerState {
    /// Directory rows by ID.
    directories: BTreeMap<i64, Directory>,
    /// Document counts by directory ID (the external collaborator).
    document_counts: HashMap<i64, u64>,
    /// Next ID to assign.
    next_id: i64,
}

/// In-memory directory store.
///
/// Suitable for single-node deployments and tests only.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectoryStore {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
}

impl MemoryDirectoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document count of a directory, standing in for the
    /// external documents collaborator.
    pub async fn seed_document_count(&self, directory_id: i64, count: u64) {
        let mut state = self.state.lock().await;
        if count == 0 {
            state.document_counts.remove(&directory_id);
        } else {
            state.document_counts.insert(directory_id, count);
        }
    }
}

fn matches_filter(dir: &Directory, filter: &DirectoryFilter) -> bool {
    match filter.parent {
        ParentFilter::Any => {}
        ParentFilter::Root => {
            if dir.parent_id.is_some() {
                return false;
            }
        }
        ParentFilter::Directory(id) => {
            if dir.parent_id != Some(id) {
                return false;
            }
        }
    }
    if let Some(name) = &filter.name {
        if !dir.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(prefix) = &filter.path_prefix {
        if !dir.path.starts_with(prefix.as_str()) {
            return false;
        }
    }
    true
}

fn compare(a: &Directory, b: &Directory, sort: &DirectorySort) -> Ordering {
    let ordering = match sort.key {
        DirectorySortKey::Name => a.name.cmp(&b.name),
        DirectorySortKey::SortOrder => a.sort_order.cmp(&b.sort_order),
        DirectorySortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        DirectorySortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    let ordering = match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    };
    ordering.then(a.id.cmp(&b.id))
}

#[async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory> {
        let mut state = self.state.lock().await;
        if state.directories.values().any(|d| d.path == data.path) {
            return Err(AppError::path_exists(format!(
                "A directory at path '{}' already exists",
                data.path
            )));
        }
        state.next_id += 1;
        let now = Utc::now();
        let directory = Directory {
            id: state.next_id,
            name: data.name.clone(),
            description: data.description.clone(),
            parent_id: data.parent_id,
            path: data.path.clone(),
            sort_order: data.sort_order,
            created_at: now,
            updated_at: now,
        };
        state.directories.insert(directory.id, directory.clone());
        Ok(directory)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Directory>> {
        let state = self.state.lock().await;
        Ok(state.directories.get(&id).cloned())
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<Directory>> {
        let state = self.state.lock().await;
        Ok(state.directories.values().find(|d| d.path == path).cloned())
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state.directories.contains_key(&id))
    }

    async fn path_exists(&self, path: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state
            .directories
            .values()
            .any(|d| d.path == path && Some(d.id) != exclude_id))
    }

    async fn find_by_parent(
        &self,
        parent_id: Option<i64>,
        sort: &DirectorySort,
    ) -> AppResult<Vec<Directory>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Directory> = state
            .directories
            .values()
            .filter(|d| d.parent_id == parent_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare(a, b, sort));
        Ok(rows)
    }

    async fn list(
        &self,
        filter: &DirectoryFilter,
        sort: &DirectorySort,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Directory>> {
        let rows = self.find_all(filter, sort).await?;
        let total = rows.len() as u64;
        let items: Vec<Directory> = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn find_all(
        &self,
        filter: &DirectoryFilter,
        sort: &DirectorySort,
    ) -> AppResult<Vec<Directory>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Directory> = state
            .directories
            .values()
            .filter(|d| matches_filter(d, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare(a, b, sort));
        Ok(rows)
    }

    async fn get_descendants(&self, id: i64) -> AppResult<Vec<Directory>> {
        let state = self.state.lock().await;
        let node = state
            .directories
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;
        let mut rows: Vec<Directory> = state
            .directories
            .values()
            .filter(|d| path_algebra::is_child_of(&d.path, &node.path))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(rows)
    }

    async fn get_ancestors(&self, id: i64) -> AppResult<Vec<Directory>> {
        let state = self.state.lock().await;
        let node = state
            .directories
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;
        let ancestors: HashSet<String> = path_algebra::ancestor_paths(&node.path)
            .into_iter()
            .collect();
        let mut rows: Vec<Directory> = state
            .directories
            .values()
            .filter(|d| ancestors.contains(&d.path))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(rows)
    }

    async fn update(&self, directory: &Directory) -> AppResult<Directory> {
        let mut state = self.state.lock().await;
        let created_at = state
            .directories
            .get(&directory.id)
            .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))?
            .created_at;
        if state
            .directories
            .values()
            .any(|d| d.path == directory.path && d.id != directory.id)
        {
            return Err(AppError::path_exists(format!(
                "A directory at path '{}' already exists",
                directory.path
            )));
        }
        let updated = Directory {
            created_at,
            updated_at: Utc::now(),
            ..directory.clone()
        };
        state.directories.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn update_paths(&self, updates: &[PathUpdate]) -> AppResult<()> {
        let mut state = self.state.lock().await;
        apply_path_updates(&mut state, updates)
    }

    async fn update_with_paths(
        &self,
        directory: &Directory,
        cascade: &[PathUpdate],
    ) -> AppResult<Directory> {
        let mut state = self.state.lock().await;

        let existing = state
            .directories
            .get(&directory.id)
            .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))?
            .clone();
        if state
            .directories
            .values()
            .any(|d| d.path == directory.path && d.id != directory.id)
        {
            return Err(AppError::path_exists(format!(
                "A directory at path '{}' already exists",
                directory.path
            )));
        }
        for update in cascade {
            if !state.directories.contains_key(&update.id) {
                return Err(AppError::database(format!(
                    "Path cascade touched missing directory {}",
                    update.id
                )));
            }
        }

        let updated = Directory {
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..directory.clone()
        };
        state.directories.insert(updated.id, updated.clone());
        apply_path_updates(&mut state, cascade)?;
        Ok(updated)
    }

    async fn next_sort_order(&self, parent_id: Option<i64>) -> AppResult<i32> {
        let state = self.state.lock().await;
        Ok(state
            .directories
            .values()
            .filter(|d| d.parent_id == parent_id)
            .map(|d| d.sort_order + 1)
            .max()
            .unwrap_or(0))
    }

    async fn reorder_siblings(
        &self,
        parent_id: Option<i64>,
        ordered_ids: &[i64],
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;

        for id in ordered_ids {
            let row = state
                .directories
                .get(id)
                .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;
            if row.parent_id != parent_id {
                return Err(AppError::invalid_parent(format!(
                    "Directory {id} does not belong to the given parent"
                )));
            }
        }

        let now = Utc::now();
        for (index, id) in ordered_ids.iter().enumerate() {
            if let Some(row) = state.directories.get_mut(id) {
                row.sort_order = index as i32;
                row.updated_at = now;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        state.document_counts.remove(&id);
        Ok(state.directories.remove(&id).is_some())
    }

    async fn document_count(&self, id: i64) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state.document_counts.get(&id).copied().unwrap_or(0))
    }

    async fn document_counts(&self, ids: &[i64]) -> AppResult<HashMap<i64, u64>> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.document_counts.get(id).map(|n| (*id, *n)))
            .collect())
    }

    async fn delete_status(&self, id: i64) -> AppResult<DeleteStatus> {
        let state = self.state.lock().await;
        let node = state
            .directories
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;

        let children_count = state
            .directories
            .values()
            .filter(|d| d.parent_id == Some(id))
            .count() as u64;
        let document_count = state.document_counts.get(&id).copied().unwrap_or(0);
        let descendant_documents: u64 = state
            .directories
            .values()
            .filter(|d| path_algebra::is_child_of(&d.path, &node.path))
            .map(|d| state.document_counts.get(&d.id).copied().unwrap_or(0))
            .sum();

        Ok(DeleteStatus::evaluate(
            children_count,
            document_count,
            document_count + descendant_documents,
        ))
    }

    async fn stats(&self) -> AppResult<DirectoryStats> {
        let state = self.state.lock().await;
        Ok(DirectoryStats {
            total_directories: state.directories.len() as u64,
            root_directories: state
                .directories
                .values()
                .filter(|d| d.parent_id.is_none())
                .count() as u64,
            max_depth: state
                .directories
                .values()
                .map(|d| path_algebra::level(&d.path) as u64)
                .max()
                .unwrap_or(0),
            total_documents: state.document_counts.values().sum(),
        })
    }
}

/// Apply a validated batch of path rewrites. Existence of every row is
/// checked before the first write so the batch never half-applies.
fn apply_path_updates(state: &mut InnerState, updates: &[PathUpdate]) -> AppResult<()> {
    for update in updates {
        if !state.directories.contains_key(&update.id) {
            return Err(AppError::database(format!(
                "Path rewrite touched missing directory {}",
                update.id
            )));
        }
    }
    let now = Utc::now();
    for update in updates {
        if let Some(row) = state.directories.get_mut(&update.id) {
            row.path = update.new_path.clone();
            row.updated_at = now;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwiki_core::error::ErrorKind;

    fn create_req(name: &str, parent_id: Option<i64>, path: &str, sort_order: i32) -> CreateDirectory {
        CreateDirectory {
            name: name.to_string(),
            description: None,
            parent_id,
            path: path.to_string(),
            sort_order,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryDirectoryStore::new();
        let a = store.create(&create_req("a", None, "/a", 0)).await.unwrap();
        let b = store.create(&create_req("b", None, "/b", 1)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_path() {
        let store = MemoryDirectoryStore::new();
        store.create(&create_req("a", None, "/a", 0)).await.unwrap();
        let err = store
            .create(&create_req("a", None, "/a", 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PathExists);
    }

    #[tokio::test]
    async fn test_next_sort_order_counts_per_parent() {
        let store = MemoryDirectoryStore::new();
        assert_eq!(store.next_sort_order(None).await.unwrap(), 0);
        store.create(&create_req("a", None, "/a", 0)).await.unwrap();
        store.create(&create_req("b", None, "/b", 4)).await.unwrap();
        assert_eq!(store.next_sort_order(None).await.unwrap(), 5);
        assert_eq!(store.next_sort_order(Some(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reorder_rejects_foreign_sibling_without_writes() {
        let store = MemoryDirectoryStore::new();
        let a = store.create(&create_req("a", None, "/a", 0)).await.unwrap();
        let b = store.create(&create_req("b", None, "/b", 1)).await.unwrap();
        let child = store
            .create(&create_req("c", Some(a.id), "/a/c", 0))
            .await
            .unwrap();

        let err = store
            .reorder_siblings(None, &[b.id, child.id, a.id])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParent);

        // Nothing was reordered.
        let rows = store
            .find_by_parent(None, &DirectorySort::default())
            .await
            .unwrap();
        assert_eq!(rows[0].sort_order, 0);
        assert_eq!(rows[1].sort_order, 1);
    }

    #[tokio::test]
    async fn test_update_paths_is_atomic() {
        let store = MemoryDirectoryStore::new();
        let a = store.create(&create_req("a", None, "/a", 0)).await.unwrap();
        let err = store
            .update_paths(&[
                PathUpdate {
                    id: a.id,
                    new_path: "/renamed".to_string(),
                },
                PathUpdate {
                    id: 999,
                    new_path: "/ghost".to_string(),
                },
            ])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        let unchanged = store.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(unchanged.path, "/a");
    }

    #[tokio::test]
    async fn test_get_ancestors_orders_root_to_leaf() {
        let store = MemoryDirectoryStore::new();
        let a = store.create(&create_req("a", None, "/a", 0)).await.unwrap();
        let b = store
            .create(&create_req("b", Some(a.id), "/a/b", 0))
            .await
            .unwrap();
        let c = store
            .create(&create_req("c", Some(b.id), "/a/b/c", 0))
            .await
            .unwrap();

        let ancestors = store.get_ancestors(c.id).await.unwrap();
        let paths: Vec<&str> = ancestors.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/a/b"]);

        let descendants = store.get_descendants(a.id).await.unwrap();
        let paths: Vec<&str> = descendants.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["/a/b", "/a/b/c"]);
    }

    #[tokio::test]
    async fn test_delete_status_gates_on_direct_content() {
        let store = MemoryDirectoryStore::new();
        let a = store.create(&create_req("a", None, "/a", 0)).await.unwrap();
        let b = store
            .create(&create_req("b", Some(a.id), "/a/b", 0))
            .await
            .unwrap();
        store.seed_document_count(b.id, 3).await;

        let status = store.delete_status(a.id).await.unwrap();
        assert!(!status.can_delete);
        assert!(status.has_children);
        assert!(!status.has_documents);
        assert_eq!(status.total_document_count, 3);

        let leaf_status = store.delete_status(b.id).await.unwrap();
        assert!(!leaf_status.can_delete);
        assert!(leaf_status.has_documents);
    }
}
