//! Directory CRUD orchestration.
//!
//! Every public operation runs validate → read → compute → write and
//! leaves the tree invariant-respecting on success or untouched on
//! failure. Cascading path rewrites are computed in memory as an
//! explicit batch and committed together with the row update in one
//! store transaction.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use docwiki_core::error::AppError;
use docwiki_core::result::AppResult;
use docwiki_core::types::{PageRequest, PageResponse};
use docwiki_database::store::DirectoryStore;
use docwiki_entity::directory::{
    name as name_rules, path as path_algebra, CreateDirectory, DeleteStatus, Directory,
    DirectoryFilter, DirectorySort, DirectoryStats, MoveOutcome, ParentUpdate, PathChange,
    PathUpdate, UpdateDirectory,
};

/// Manages directory CRUD operations.
#[derive(Clone)]
pub struct DirectoryService {
    /// Directory store.
    store: Arc<dyn DirectoryStore>,
}

/// Request to create a new directory.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateDirectoryRequest {
    /// Parent directory ID (None for root-level).
    pub parent_id: Option<i64>,
    /// Directory name (sanitized before storage).
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Display order; defaults to the end of the sibling list.
    pub sort_order: Option<i32>,
}

impl DirectoryService {
    /// Creates a new directory service.
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Creates a new directory.
    pub async fn create(&self, req: CreateDirectoryRequest) -> AppResult<Directory> {
        let clean_name = name_rules::sanitize_name(&req.name);
        if !name_rules::validate_name(&clean_name) {
            return Err(AppError::validation(format!(
                "Invalid directory name '{}'",
                req.name
            )));
        }
        if !name_rules::validate_description(req.description.as_deref()) {
            return Err(AppError::validation(
                "Description must be at most 1000 characters",
            ));
        }
        if !name_rules::validate_sort_order(req.sort_order) {
            return Err(AppError::validation(
                "Sort order must be a non-negative integer",
            ));
        }

        let parent = match req.parent_id {
            Some(parent_id) => Some(self.store.find_by_id(parent_id).await?.ok_or_else(|| {
                AppError::parent_not_found(format!("Parent directory {parent_id} not found"))
            })?),
            None => None,
        };

        let path = path_algebra::build_path(parent.as_ref().map(|p| p.path.as_str()), &clean_name);
        if self.store.path_exists(&path, None).await? {
            return Err(AppError::path_exists(format!(
                "A directory at path '{path}' already exists"
            )));
        }

        let sort_order = match req.sort_order {
            Some(n) => n,
            None => self.store.next_sort_order(req.parent_id).await?,
        };

        let created = self
            .store
            .create(&CreateDirectory {
                name: clean_name,
                description: req.description,
                parent_id: req.parent_id,
                path,
                sort_order,
            })
            .await?;

        info!(
            directory_id = created.id,
            path = %created.path,
            "Directory created"
        );
        Ok(created)
    }

    /// Gets a directory by ID.
    pub async fn get(&self, id: i64) -> AppResult<Option<Directory>> {
        self.store.find_by_id(id).await
    }

    /// Lists directories with filtering, sorting, and pagination.
    pub async fn list(
        &self,
        filter: &DirectoryFilter,
        sort: &DirectorySort,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Directory>> {
        if let Some(prefix) = &filter.path_prefix {
            if !prefix.starts_with('/') {
                return Err(AppError::validation("Path prefix must start with '/'"));
            }
        }
        self.store.list(filter, sort, page).await
    }

    /// Updates a directory. Renames and re-parents recompute the path
    /// and cascade it to every descendant.
    pub async fn update(&self, id: i64, changes: UpdateDirectory) -> AppResult<Directory> {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;

        let new_name = match &changes.name {
            Some(raw) => {
                let clean = name_rules::sanitize_name(raw);
                if !name_rules::validate_name(&clean) {
                    return Err(AppError::validation(format!(
                        "Invalid directory name '{raw}'"
                    )));
                }
                clean
            }
            None => current.name.clone(),
        };
        if !name_rules::validate_description(changes.description.as_deref()) {
            return Err(AppError::validation(
                "Description must be at most 1000 characters",
            ));
        }
        if !name_rules::validate_sort_order(changes.sort_order) {
            return Err(AppError::validation(
                "Sort order must be a non-negative integer",
            ));
        }

        let parent_changed = match changes.parent {
            ParentUpdate::Keep => false,
            ParentUpdate::Root => current.parent_id.is_some(),
            ParentUpdate::To(parent_id) => current.parent_id != Some(parent_id),
        };

        let (new_parent_id, new_parent_path) = if parent_changed {
            match changes.parent {
                ParentUpdate::Root => (None, None),
                ParentUpdate::To(parent_id) => {
                    if parent_id == id {
                        return Err(AppError::invalid_parent(
                            "A directory cannot be its own parent",
                        ));
                    }
                    let parent =
                        self.store.find_by_id(parent_id).await?.ok_or_else(|| {
                            AppError::parent_not_found(format!(
                                "Parent directory {parent_id} not found"
                            ))
                        })?;
                    if path_algebra::would_create_cycle(&current.path, &parent.path) {
                        return Err(AppError::circular_reference(
                            "A directory cannot be moved into its own subtree",
                        ));
                    }
                    (Some(parent_id), Some(parent.path))
                }
                ParentUpdate::Keep => unreachable!(),
            }
        } else {
            let parent_path = if current.parent_id.is_some() {
                Some(path_algebra::parent_path(&current.path))
            } else {
                None
            };
            (current.parent_id, parent_path)
        };

        let new_path = path_algebra::build_path(new_parent_path.as_deref(), &new_name);

        let updated = Directory {
            name: new_name,
            description: changes.description.or_else(|| current.description.clone()),
            parent_id: new_parent_id,
            path: new_path,
            sort_order: changes.sort_order.unwrap_or(current.sort_order),
            ..current.clone()
        };

        let (directory, changes) = self.commit(&current, updated).await?;
        info!(
            directory_id = directory.id,
            path = %directory.path,
            cascaded = changes.len(),
            "Directory updated"
        );
        Ok(directory)
    }

    /// Moves a directory under a new parent (None = root level).
    ///
    /// Returns the moved directory plus the old/new path of every
    /// affected descendant so callers can reconcile external references.
    pub async fn move_directory(
        &self,
        source_id: i64,
        target_parent_id: Option<i64>,
        new_sort_order: Option<i32>,
    ) -> AppResult<MoveOutcome> {
        let current = self
            .store
            .find_by_id(source_id)
            .await?
            .ok_or_else(|| AppError::source_not_found(format!("Directory {source_id} not found")))?;

        if target_parent_id == Some(source_id) {
            return Err(AppError::invalid_target(
                "A directory cannot be moved into itself",
            ));
        }
        if !name_rules::validate_sort_order(new_sort_order) {
            return Err(AppError::validation(
                "Sort order must be a non-negative integer",
            ));
        }

        let target_parent = match target_parent_id {
            Some(parent_id) => {
                Some(self.store.find_by_id(parent_id).await?.ok_or_else(|| {
                    AppError::target_parent_not_found(format!(
                        "Target parent directory {parent_id} not found"
                    ))
                })?)
            }
            None => None,
        };
        if let Some(parent) = &target_parent {
            if path_algebra::would_create_cycle(&current.path, &parent.path) {
                return Err(AppError::circular_reference(
                    "A directory cannot be moved into its own subtree",
                ));
            }
        }

        let parent_unchanged = current.parent_id == target_parent_id;
        let sort_order = match new_sort_order {
            Some(n) => n,
            None if parent_unchanged => current.sort_order,
            None => self.store.next_sort_order(target_parent_id).await?,
        };

        let new_path = path_algebra::build_path(
            target_parent.as_ref().map(|p| p.path.as_str()),
            &current.name,
        );

        let updated = Directory {
            parent_id: target_parent_id,
            path: new_path,
            sort_order,
            ..current.clone()
        };

        let (directory, changes) = self.commit(&current, updated).await?;
        info!(
            directory_id = directory.id,
            old_path = %current.path,
            new_path = %directory.path,
            cascaded = changes.len(),
            "Directory moved"
        );
        Ok(MoveOutcome { directory, changes })
    }

    /// Reports whether a directory can be deleted and why not.
    pub async fn delete_status(&self, id: i64) -> AppResult<DeleteStatus> {
        self.store.delete_status(id).await
    }

    /// Deletes a directory. Refused while direct children or documents
    /// remain; the error carries the full delete-safety report.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let directory = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;

        let status = self.store.delete_status(id).await?;
        if !status.can_delete {
            warn!(
                directory_id = id,
                path = %directory.path,
                children = status.children_count,
                documents = status.document_count,
                "Refusing to delete non-empty directory"
            );
            let details = serde_json::to_value(&status)?;
            return Err(AppError::not_empty(format!(
                "Directory '{}' is not empty",
                directory.name
            ))
            .with_details(details));
        }

        self.store.delete(id).await?;
        info!(directory_id = id, path = %directory.path, "Directory deleted");
        Ok(())
    }

    /// Reorders siblings under a parent: each ID receives its index in
    /// `ordered_ids` as `sort_order`.
    pub async fn reorder(&self, parent_id: Option<i64>, ordered_ids: &[i64]) -> AppResult<()> {
        if ordered_ids.is_empty() {
            return Err(AppError::validation("Ordered ID list must not be empty"));
        }
        let unique: HashSet<i64> = ordered_ids.iter().copied().collect();
        if unique.len() != ordered_ids.len() {
            return Err(AppError::validation(
                "Ordered ID list must not contain duplicates",
            ));
        }
        if let Some(parent_id) = parent_id {
            if !self.store.exists(parent_id).await? {
                return Err(AppError::parent_not_found(format!(
                    "Parent directory {parent_id} not found"
                )));
            }
        }
        for id in ordered_ids {
            let directory = self
                .store
                .find_by_id(*id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;
            if directory.parent_id != parent_id {
                return Err(AppError::invalid_parent(format!(
                    "Directory {id} does not belong to the given parent"
                )));
            }
        }

        self.store.reorder_siblings(parent_id, ordered_ids).await?;
        info!(
            parent_id = ?parent_id,
            siblings = ordered_ids.len(),
            "Siblings reordered"
        );
        Ok(())
    }

    /// Aggregate statistics over the whole tree.
    pub async fn stats(&self) -> AppResult<DirectoryStats> {
        self.store.stats().await
    }

    /// Commit a row update. When the path changed, verify uniqueness,
    /// compute the descendant cascade, and commit everything in one
    /// store transaction.
    async fn commit(
        &self,
        current: &Directory,
        updated: Directory,
    ) -> AppResult<(Directory, Vec<PathChange>)> {
        if updated.path == current.path {
            let directory = self.store.update(&updated).await?;
            return Ok((directory, Vec::new()));
        }

        if self.store.path_exists(&updated.path, Some(current.id)).await? {
            return Err(AppError::path_exists(format!(
                "A directory at path '{}' already exists",
                updated.path
            )));
        }

        let descendants = self.store.get_descendants(current.id).await?;
        let old_prefix = path_algebra::descendant_prefix(&current.path);
        let new_prefix = path_algebra::descendant_prefix(&updated.path);

        let mut cascade = Vec::with_capacity(descendants.len());
        let mut changes = Vec::with_capacity(descendants.len());
        for descendant in &descendants {
            let suffix = &descendant.path[old_prefix.len()..];
            let new_path = format!("{new_prefix}{suffix}");
            cascade.push(PathUpdate {
                id: descendant.id,
                new_path: new_path.clone(),
            });
            changes.push(PathChange {
                id: descendant.id,
                old_path: descendant.path.clone(),
                new_path,
            });
        }

        let directory = self.store.update_with_paths(&updated, &cascade).await?;
        Ok((directory, changes))
    }
}
