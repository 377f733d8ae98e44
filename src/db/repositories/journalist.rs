//! Journalist repository
//!
//! Database operations for journalist application records.
//!
//! Status writes are single-row overwrites: re-applying an already-stored
//! status is a harmless no-op, which is what the approval saga relies on.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ApplicationStatus, Journalist, ReviewCounts};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Journalist repository trait
#[async_trait]
pub trait JournalistRepository: Send + Sync {
    /// Create a pending application for the given user
    async fn create(&self, user_id: i64) -> Result<Journalist>;

    /// Get application by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Journalist>>;

    /// Overwrite an application's status, returning the updated record.
    /// Returns `None` if no application has the given id.
    async fn set_status(&self, id: i64, status: ApplicationStatus) -> Result<Option<Journalist>>;

    /// Mark an application as soft-deleted. Returns whether a row matched.
    async fn mark_deleted(&self, id: i64) -> Result<bool>;

    /// List all active (non-deleted) applications
    async fn list(&self) -> Result<Vec<Journalist>>;

    /// Count applications grouped by status
    async fn count_by_status(&self) -> Result<ReviewCounts>;
}

/// SQLx-based journalist repository implementation
pub struct SqlxJournalistRepository {
    pool: DynDatabasePool,
}

impl SqlxJournalistRepository {
    /// Create a new SQLx journalist repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn JournalistRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl JournalistRepository for SqlxJournalistRepository {
    async fn create(&self, user_id: i64) -> Result<Journalist> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), user_id).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), user_id).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Journalist>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn set_status(&self, id: i64, status: ApplicationStatus) -> Result<Option<Journalist>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_status_sqlite(self.pool.as_sqlite().unwrap(), id, status).await
            }
            DatabaseDriver::Mysql => {
                set_status_mysql(self.pool.as_mysql().unwrap(), id, status).await
            }
        }
    }

    async fn mark_deleted(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => mark_deleted_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => mark_deleted_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Journalist>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn count_by_status(&self) -> Result<ReviewCounts> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_by_status_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_by_status_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, user_id: i64) -> Result<Journalist> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO journalists (user_id, status, is_deleted, created_at, updated_at)
        VALUES (?, 'pending', 0, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create journalist application")?;

    Ok(Journalist {
        id: result.last_insert_rowid(),
        user_id,
        status: ApplicationStatus::Pending,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Journalist>> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, status, is_deleted, created_at, updated_at
        FROM journalists
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get journalist by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_journalist_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn set_status_sqlite(
    pool: &SqlitePool,
    id: i64,
    status: ApplicationStatus,
) -> Result<Option<Journalist>> {
    let now = Utc::now();

    sqlx::query("UPDATE journalists SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update journalist status")?;

    get_by_id_sqlite(pool, id).await
}

async fn mark_deleted_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let now = Utc::now();

    let result = sqlx::query("UPDATE journalists SET is_deleted = 1, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to soft-delete journalist")?;

    Ok(result.rows_affected() > 0)
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Journalist>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, status, is_deleted, created_at, updated_at
        FROM journalists
        WHERE is_deleted = 0
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list journalists")?;

    let mut journalists = Vec::new();
    for row in rows {
        journalists.push(row_to_journalist_sqlite(&row)?);
    }

    Ok(journalists)
}

async fn count_by_status_sqlite(pool: &SqlitePool) -> Result<ReviewCounts> {
    let rows = sqlx::query("SELECT status, COUNT(*) as count FROM journalists GROUP BY status")
        .fetch_all(pool)
        .await
        .context("Failed to count journalists by status")?;

    fold_status_counts(rows.iter().map(|row| (row.get("status"), row.get("count"))))
}

fn row_to_journalist_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Journalist> {
    let status_str: String = row.get("status");
    let status = ApplicationStatus::from_str(&status_str)
        .with_context(|| format!("Invalid application status in database: {}", status_str))?;

    Ok(Journalist {
        id: row.get("id"),
        user_id: row.get("user_id"),
        status,
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, user_id: i64) -> Result<Journalist> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO journalists (user_id, status, is_deleted, created_at, updated_at)
        VALUES (?, 'pending', FALSE, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create journalist application")?;

    Ok(Journalist {
        id: result.last_insert_id() as i64,
        user_id,
        status: ApplicationStatus::Pending,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Journalist>> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, status, is_deleted, created_at, updated_at
        FROM journalists
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get journalist by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_journalist_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn set_status_mysql(
    pool: &MySqlPool,
    id: i64,
    status: ApplicationStatus,
) -> Result<Option<Journalist>> {
    let now = Utc::now();

    sqlx::query("UPDATE journalists SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update journalist status")?;

    get_by_id_mysql(pool, id).await
}

async fn mark_deleted_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let now = Utc::now();

    let result =
        sqlx::query("UPDATE journalists SET is_deleted = TRUE, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(pool)
            .await
            .context("Failed to soft-delete journalist")?;

    if result.rows_affected() > 0 {
        return Ok(true);
    }

    Ok(get_by_id_mysql(pool, id).await?.is_some())
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Journalist>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, status, is_deleted, created_at, updated_at
        FROM journalists
        WHERE is_deleted = FALSE
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list journalists")?;

    let mut journalists = Vec::new();
    for row in rows {
        journalists.push(row_to_journalist_mysql(&row)?);
    }

    Ok(journalists)
}

async fn count_by_status_mysql(pool: &MySqlPool) -> Result<ReviewCounts> {
    let rows = sqlx::query("SELECT status, COUNT(*) as count FROM journalists GROUP BY status")
        .fetch_all(pool)
        .await
        .context("Failed to count journalists by status")?;

    fold_status_counts(rows.iter().map(|row| (row.get("status"), row.get("count"))))
}

fn row_to_journalist_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Journalist> {
    let status_str: String = row.get("status");
    let status = ApplicationStatus::from_str(&status_str)
        .with_context(|| format!("Invalid application status in database: {}", status_str))?;

    Ok(Journalist {
        id: row.get("id"),
        user_id: row.get("user_id"),
        status,
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Fold (status, count) rows into a `ReviewCounts`, rejecting unknown statuses
fn fold_status_counts(rows: impl Iterator<Item = (String, i64)>) -> Result<ReviewCounts> {
    let mut counts = ReviewCounts::default();
    for (status, count) in rows {
        match ApplicationStatus::from_str(&status) {
            Some(ApplicationStatus::Pending) => counts.pending = count,
            Some(ApplicationStatus::Approved) => counts.approved = count,
            Some(ApplicationStatus::Rejected) => counts.rejected = count,
            None => anyhow::bail!("Invalid application status in database: {}", status),
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxJournalistRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxJournalistRepository::new(pool.clone());
        (pool, repo)
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo.create(42).await.expect("Failed to create application");

        assert!(created.id > 0);
        assert_eq!(created.user_id, 42);
        assert_eq!(created.status, ApplicationStatus::Pending);
        assert!(!created.is_deleted);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo.get_by_id(999).await.expect("Query should succeed");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_set_status() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create(1).await.expect("Failed to create application");

        let updated = repo
            .set_status(created.id, ApplicationStatus::Approved)
            .await
            .expect("Failed to set status")
            .expect("Application not found");

        assert_eq!(updated.status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn test_set_status_missing_application() {
        let (_pool, repo) = setup_test_repo().await;

        let updated = repo
            .set_status(777, ApplicationStatus::Rejected)
            .await
            .expect("Query should succeed");

        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_set_status_reapply_is_noop() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create(1).await.expect("Failed to create application");

        repo.set_status(created.id, ApplicationStatus::Approved)
            .await
            .expect("First write failed");
        let second = repo
            .set_status(created.id, ApplicationStatus::Approved)
            .await
            .expect("Second write failed")
            .expect("Application not found");

        assert_eq!(second.status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn test_mark_deleted_hides_from_listing() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create(1).await.expect("Failed to create application");

        assert!(repo.mark_deleted(created.id).await.expect("Delete failed"));

        let listed = repo.list().await.expect("Failed to list");
        assert!(listed.is_empty());

        // Row still exists for direct lookup
        let row = repo
            .get_by_id(created.id)
            .await
            .expect("Query should succeed")
            .expect("Row should remain");
        assert!(row.is_deleted);
    }

    #[tokio::test]
    async fn test_count_by_status() {
        let (_pool, repo) = setup_test_repo().await;

        let a = repo.create(1).await.expect("create");
        let b = repo.create(2).await.expect("create");
        repo.create(3).await.expect("create");

        repo.set_status(a.id, ApplicationStatus::Approved)
            .await
            .expect("set status");
        repo.set_status(b.id, ApplicationStatus::Rejected)
            .await
            .expect("set status");

        let counts = repo.count_by_status().await.expect("count");
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.approved, 1);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test]
    async fn test_count_by_status_empty() {
        let (_pool, repo) = setup_test_repo().await;

        let counts = repo.count_by_status().await.expect("count");
        assert_eq!(counts, ReviewCounts::default());
    }
}
