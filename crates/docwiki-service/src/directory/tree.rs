//! Directory tree assembly and breadcrumb resolution.

use std::sync::Arc;

use docwiki_core::error::AppError;
use docwiki_core::result::AppResult;
use docwiki_database::store::DirectoryStore;
use docwiki_entity::directory::path::{self as path_algebra, PathSegment};
use docwiki_entity::directory::{
    build_subtree, build_tree, DirectoryFilter, DirectoryNode, DirectorySort,
};

/// Builds directory trees and resolves breadcrumb trails.
#[derive(Clone)]
pub struct TreeService {
    /// Directory store.
    store: Arc<dyn DirectoryStore>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Assembles the whole forest with per-directory document counts.
    pub async fn tree(&self) -> AppResult<Vec<DirectoryNode>> {
        let rows = self
            .store
            .find_all(&DirectoryFilter::default(), &DirectorySort::default())
            .await?;
        let ids: Vec<i64> = rows.iter().map(|d| d.id).collect();
        let counts = self.store.document_counts(&ids).await?;
        Ok(build_tree(&rows, &counts))
    }

    /// Assembles the subtree rooted at the given directory.
    pub async fn subtree(&self, id: i64) -> AppResult<DirectoryNode> {
        let root = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;
        let descendants = self.store.get_descendants(id).await?;

        let mut ids: Vec<i64> = vec![root.id];
        ids.extend(descendants.iter().map(|d| d.id));
        let counts = self.store.document_counts(&ids).await?;

        Ok(build_subtree(&root, &descendants, &counts))
    }

    /// The breadcrumb trail from the root to the given directory,
    /// reconstructed from its stored path without extra lookups.
    pub async fn breadcrumbs(&self, id: i64) -> AppResult<Vec<PathSegment>> {
        let directory = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;
        Ok(path_algebra::parse_path_info(&directory.path))
    }
}
