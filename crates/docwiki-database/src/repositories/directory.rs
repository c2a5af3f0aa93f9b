//! PostgreSQL directory store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use docwiki_core::error::{AppError, ErrorKind};
use docwiki_core::result::AppResult;
use docwiki_core::types::{PageRequest, PageResponse};
use docwiki_entity::directory::path as path_algebra;
use docwiki_entity::directory::{
    CreateDirectory, DeleteStatus, Directory, DirectoryFilter, DirectorySort, DirectoryStats,
    ParentFilter, PathUpdate,
};

use crate::store::DirectoryStore;

/// Directory store backed by PostgreSQL.
///
/// Descendant and ancestor queries run against the materialized `path`
/// column (`starts_with` prefix scans); multi-row cascades run inside
/// explicit transactions.
#[derive(Debug, Clone)]
pub struct PostgresDirectoryStore {
    pool: PgPool,
}

impl PostgresDirectoryStore {
    /// Create a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a directory or fail with the given not-found kind.
    async fn require(&self, id: i64, kind: ErrorKind) -> AppResult<Directory> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(kind, format!("Directory {id} not found")))
    }

    fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a DirectoryFilter) {
        match filter.parent {
            ParentFilter::Any => {}
            ParentFilter::Root => {
                builder.push(" AND parent_id IS NULL");
            }
            ParentFilter::Directory(id) => {
                builder.push(" AND parent_id = ").push_bind(id);
            }
        }
        if let Some(name) = &filter.name {
            builder
                .push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(name)));
        }
        if let Some(prefix) = &filter.path_prefix {
            builder
                .push(" AND starts_with(path, ")
                .push_bind(prefix.as_str())
                .push(")");
        }
    }

    fn push_order(builder: &mut QueryBuilder<'_, Postgres>, sort: &DirectorySort) {
        builder
            .push(" ORDER BY ")
            .push(sort.key.as_sql())
            .push(" ")
            .push(sort.direction.as_sql())
            .push(", id ASC");
    }
}

#[async_trait]
impl DirectoryStore for PostgresDirectoryStore {
    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory> {
        sqlx::query_as::<_, Directory>(
            "INSERT INTO directories (name, description, parent_id, path, sort_order) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.parent_id)
        .bind(&data.path)
        .bind(data.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_path_conflict(e, &data.path, "Failed to create directory"))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Directory>> {
        sqlx::query_as::<_, Directory>("SELECT * FROM directories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find directory", e))
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<Directory>> {
        sqlx::query_as::<_, Directory>("SELECT * FROM directories WHERE path = $1")
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find directory by path", e)
            })
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM directories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check directory", e)
            })
    }

    async fn path_exists(&self, path: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM directories \
             WHERE path = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(path)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check path", e))
    }

    async fn find_by_parent(
        &self,
        parent_id: Option<i64>,
        sort: &DirectorySort,
    ) -> AppResult<Vec<Directory>> {
        let sql = format!(
            "SELECT * FROM directories WHERE parent_id IS NOT DISTINCT FROM $1 \
             ORDER BY {} {}, id ASC",
            sort.key.as_sql(),
            sort.direction.as_sql()
        );
        sqlx::query_as::<_, Directory>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn list(
        &self,
        filter: &DirectoryFilter,
        sort: &DirectorySort,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Directory>> {
        let mut count_builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM directories WHERE TRUE");
        Self::push_filter(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count directories", e)
            })?;

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM directories WHERE TRUE");
        Self::push_filter(&mut builder, filter);
        Self::push_order(&mut builder, sort);
        builder
            .push(" LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let items = builder
            .build_query_as::<Directory>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list directories", e)
            })?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn find_all(
        &self,
        filter: &DirectoryFilter,
        sort: &DirectorySort,
    ) -> AppResult<Vec<Directory>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM directories WHERE TRUE");
        Self::push_filter(&mut builder, filter);
        Self::push_order(&mut builder, sort);
        builder
            .build_query_as::<Directory>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list directories", e)
            })
    }

    async fn get_descendants(&self, id: i64) -> AppResult<Vec<Directory>> {
        let node = self.require(id, ErrorKind::NotFound).await?;
        let prefix = path_algebra::descendant_prefix(&node.path);
        sqlx::query_as::<_, Directory>(
            "SELECT * FROM directories WHERE starts_with(path, $1) AND id <> $2 \
             ORDER BY path ASC",
        )
        .bind(prefix)
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list descendants", e))
    }

    async fn get_ancestors(&self, id: i64) -> AppResult<Vec<Directory>> {
        let node = self.require(id, ErrorKind::NotFound).await?;
        let paths: Vec<String> = path_algebra::ancestor_paths(&node.path)
            .into_iter()
            .filter(|p| p != path_algebra::ROOT_PATH)
            .collect();
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Directory>(
            "SELECT * FROM directories WHERE path = ANY($1) ORDER BY path ASC",
        )
        .bind(&paths)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ancestors", e))
    }

    async fn update(&self, directory: &Directory) -> AppResult<Directory> {
        sqlx::query_as::<_, Directory>(
            "UPDATE directories SET name = $2, description = $3, parent_id = $4, path = $5, \
             sort_order = $6, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(directory.id)
        .bind(&directory.name)
        .bind(&directory.description)
        .bind(directory.parent_id)
        .bind(&directory.path)
        .bind(directory.sort_order)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_path_conflict(e, &directory.path, "Failed to update directory"))?
        .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))
    }

    async fn update_paths(&self, updates: &[PathUpdate]) -> AppResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        for update in updates {
            let result = sqlx::query(
                "UPDATE directories SET path = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(update.id)
            .bind(&update.new_path)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_path_conflict(e, &update.new_path, "Failed to rewrite path"))?;

            if result.rows_affected() != 1 {
                return Err(AppError::database(format!(
                    "Path rewrite touched missing directory {}",
                    update.id
                )));
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit path rewrites", e)
        })?;
        debug!(rows = updates.len(), "Rewrote directory paths");
        Ok(())
    }

    async fn update_with_paths(
        &self,
        directory: &Directory,
        cascade: &[PathUpdate],
    ) -> AppResult<Directory> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let updated = sqlx::query_as::<_, Directory>(
            "UPDATE directories SET name = $2, description = $3, parent_id = $4, path = $5, \
             sort_order = $6, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(directory.id)
        .bind(&directory.name)
        .bind(&directory.description)
        .bind(directory.parent_id)
        .bind(&directory.path)
        .bind(directory.sort_order)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_path_conflict(e, &directory.path, "Failed to update directory"))?
        .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))?;

        for update in cascade {
            let result = sqlx::query(
                "UPDATE directories SET path = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(update.id)
            .bind(&update.new_path)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_path_conflict(e, &update.new_path, "Failed to rewrite path"))?;

            if result.rows_affected() != 1 {
                return Err(AppError::database(format!(
                    "Path cascade touched missing directory {}",
                    update.id
                )));
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit directory update", e)
        })?;
        Ok(updated)
    }

    async fn next_sort_order(&self, parent_id: Option<i64>) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM directories \
             WHERE parent_id IS NOT DISTINCT FROM $1",
        )
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to compute sort order", e)
        })
    }

    async fn reorder_siblings(
        &self,
        parent_id: Option<i64>,
        ordered_ids: &[i64],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        for (index, id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE directories SET sort_order = $2, updated_at = NOW() \
                 WHERE id = $1 AND parent_id IS NOT DISTINCT FROM $3",
            )
            .bind(id)
            .bind(index as i32)
            .bind(parent_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to reorder sibling", e)
            })?;

            if result.rows_affected() != 1 {
                return Err(AppError::invalid_parent(format!(
                    "Directory {id} does not belong to the given parent"
                )));
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit reorder", e)
        })
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM directories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete directory", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn document_count(&self, id: i64) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE directory_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count documents", e)
                })?;
        Ok(count as u64)
    }

    async fn document_counts(&self, ids: &[i64]) -> AppResult<HashMap<i64, u64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT directory_id, COUNT(*) FROM documents \
             WHERE directory_id = ANY($1) GROUP BY directory_id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count documents", e)
        })?;
        Ok(rows.into_iter().map(|(id, n)| (id, n as u64)).collect())
    }

    async fn delete_status(&self, id: i64) -> AppResult<DeleteStatus> {
        let node = self.require(id, ErrorKind::NotFound).await?;

        let children_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM directories WHERE parent_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count children", e)
                })?;

        let document_count = self.document_count(id).await?;

        let prefix = path_algebra::descendant_prefix(&node.path);
        let total_document_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents d \
             INNER JOIN directories dir ON d.directory_id = dir.id \
             WHERE dir.id = $1 OR starts_with(dir.path, $2)",
        )
        .bind(id)
        .bind(prefix)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count subtree documents", e)
        })?;

        Ok(DeleteStatus::evaluate(
            children_count as u64,
            document_count,
            total_document_count as u64,
        ))
    }

    async fn stats(&self) -> AppResult<DirectoryStats> {
        let (total, roots, max_depth): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE parent_id IS NULL), \
                    COALESCE(MAX(char_length(path) - char_length(replace(path, '/', ''))), 0)::BIGINT \
             FROM directories",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to aggregate directories", e)
        })?;

        let total_documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count documents", e)
            })?;

        Ok(DirectoryStats {
            total_directories: total as u64,
            root_directories: roots as u64,
            max_depth: max_depth as u64,
            total_documents: total_documents as u64,
        })
    }
}

/// Map a unique-constraint violation on the path index to a
/// `PATH_EXISTS` error; everything else becomes a database error.
fn map_path_conflict(e: sqlx::Error, path: &str, context: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("directories_path_key") => {
            AppError::path_exists(format!("A directory at path '{path}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}

/// Escape LIKE wildcards in a user-supplied substring.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("plain"), "plain");
    }
}
