//! Directory use cases: CRUD orchestration and tree assembly.

pub mod service;
pub mod tree;

pub use service::{CreateDirectoryRequest, DirectoryService};
pub use tree::TreeService;
