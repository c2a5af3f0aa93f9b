//! # docwiki-service
//!
//! Business logic service layer for DocWiki. Each service orchestrates
//! the directory store and the pure tree logic to implement
//! application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod directory;

pub use directory::{CreateDirectoryRequest, DirectoryService, TreeService};
