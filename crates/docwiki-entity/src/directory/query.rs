//! Filter and sort specifications for directory listings.

use serde::{Deserialize, Serialize};

use docwiki_core::types::SortDirection;

/// Parent constraint of a directory listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentFilter {
    /// Any parent.
    #[default]
    Any,
    /// Root-level directories only (`parent_id IS NULL`).
    Root,
    /// Direct children of the given directory.
    Directory(i64),
}

/// Filter conditions for directory listings. All fields combine with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryFilter {
    /// Restrict to a parent.
    #[serde(default)]
    pub parent: ParentFilter,
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Materialized-path prefix (e.g. `/guides/`).
    pub path_prefix: Option<String>,
}

/// Columns a directory listing can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectorySortKey {
    /// Display name.
    Name,
    /// Sibling display order.
    #[default]
    SortOrder,
    /// Creation timestamp.
    CreatedAt,
    /// Last-update timestamp.
    UpdatedAt,
}

impl DirectorySortKey {
    /// Return the column name for this key.
    ///
    /// Restricting ORDER BY input to these variants keeps user-supplied
    /// sort fields out of SQL strings.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::SortOrder => "sort_order",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// A complete sort specification.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DirectorySort {
    /// Column to sort by.
    #[serde(default)]
    pub key: DirectorySortKey,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl DirectorySort {
    /// Ascending sort on the given key.
    pub fn asc(key: DirectorySortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on the given key.
    pub fn desc(key: DirectorySortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }
}
