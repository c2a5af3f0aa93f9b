//! Shared helpers for service tests.

use std::sync::Arc;

use docwiki_database::repositories::MemoryDirectoryStore;
use docwiki_entity::directory::Directory;
use docwiki_service::{CreateDirectoryRequest, DirectoryService, TreeService};

/// Build the service stack over a fresh in-memory store.
pub fn setup() -> (DirectoryService, TreeService, Arc<MemoryDirectoryStore>) {
    let store = Arc::new(MemoryDirectoryStore::new());
    (
        DirectoryService::new(store.clone()),
        TreeService::new(store.clone()),
        store,
    )
}

/// Create a directory with defaults, panicking on failure.
pub async fn create(
    service: &DirectoryService,
    parent_id: Option<i64>,
    name: &str,
) -> Directory {
    service
        .create(CreateDirectoryRequest {
            parent_id,
            name: name.to_string(),
            description: None,
            sort_order: None,
        })
        .await
        .expect("create directory")
}
