//! Directory entity and the pure logic of the directory tree.

pub mod model;
pub mod name;
pub mod path;
pub mod query;
pub mod tree;

pub use model::{
    CreateDirectory, DeleteStatus, Directory, DirectoryStats, MoveOutcome, ParentUpdate,
    PathChange, PathUpdate, UpdateDirectory,
};
pub use query::{DirectoryFilter, DirectorySort, DirectorySortKey, ParentFilter};
pub use tree::{DirectoryNode, build_subtree, build_tree};
