//! User repository
//!
//! Database operations for user accounts.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL
//!
//! Role changes and soft deletion are single-row overwrites so repeated
//! writes of the same value converge to the same stored state.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateUserInput, User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// One month's worth of account creations, broken down by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyRoleRow {
    /// Calendar month, 1-12
    pub month: u32,
    pub readers: i64,
    pub journalists: i64,
    pub admins: i64,
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, input: &CreateUserInput) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Overwrite a user's role, returning the updated user.
    /// Returns `None` if no user has the given id.
    async fn set_role(&self, id: i64, role: UserRole) -> Result<Option<User>>;

    /// Mark a user as soft-deleted. Returns whether a row matched.
    async fn mark_deleted(&self, id: i64) -> Result<bool>;

    /// List all active (non-deleted) users
    async fn list(&self) -> Result<Vec<User>>;

    /// Count all users
    async fn count(&self) -> Result<i64>;

    /// Per-month role breakdown of accounts created in the given year.
    /// Months with no accounts are absent from the result.
    async fn role_counts_by_month(&self, year: i32) -> Result<Vec<MonthlyRoleRow>>;
}

/// SQLx-based user repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_email_sqlite(self.pool.as_sqlite().unwrap(), email).await
            }
            DatabaseDriver::Mysql => get_by_email_mysql(self.pool.as_mysql().unwrap(), email).await,
        }
    }

    async fn set_role(&self, id: i64, role: UserRole) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_role_sqlite(self.pool.as_sqlite().unwrap(), id, role).await
            }
            DatabaseDriver::Mysql => set_role_mysql(self.pool.as_mysql().unwrap(), id, role).await,
        }
    }

    async fn mark_deleted(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => mark_deleted_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => mark_deleted_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self) -> Result<Vec<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn role_counts_by_month(&self, year: i32) -> Result<Vec<MonthlyRoleRow>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                role_counts_by_month_sqlite(self.pool.as_sqlite().unwrap(), year).await
            }
            DatabaseDriver::Mysql => {
                role_counts_by_month_mysql(self.pool.as_mysql().unwrap(), year).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateUserInput) -> Result<User> {
    let now = Utc::now();
    let role = input.role.unwrap_or_default();

    let result = sqlx::query(
        r#"
        INSERT INTO users (full_name, email, role, is_deleted, created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(&input.full_name)
    .bind(&input.email)
    .bind(role.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_rowid(),
        full_name: input.full_name.clone(),
        email: input.email.clone(),
        role,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, full_name, email, role, is_deleted, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_user_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_by_email_sqlite(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, full_name, email, role, is_deleted, created_at, updated_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by email")?;

    match row {
        Some(row) => Ok(Some(row_to_user_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn set_role_sqlite(pool: &SqlitePool, id: i64, role: UserRole) -> Result<Option<User>> {
    let now = Utc::now();

    sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role.to_string())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update user role")?;

    // Read back; a missing row surfaces as None here
    get_by_id_sqlite(pool, id).await
}

async fn mark_deleted_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let now = Utc::now();

    let result = sqlx::query("UPDATE users SET is_deleted = 1, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to soft-delete user")?;

    Ok(result.rows_affected() > 0)
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT id, full_name, email, role, is_deleted, created_at, updated_at
        FROM users
        WHERE is_deleted = 0
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row_to_user_sqlite(&row)?);
    }

    Ok(users)
}

async fn count_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

async fn role_counts_by_month_sqlite(pool: &SqlitePool, year: i32) -> Result<Vec<MonthlyRoleRow>> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(strftime('%m', created_at) AS INTEGER) AS month,
               SUM(CASE WHEN role = 'reader' THEN 1 ELSE 0 END) AS readers,
               SUM(CASE WHEN role = 'journalist' THEN 1 ELSE 0 END) AS journalists,
               SUM(CASE WHEN role = 'admin' THEN 1 ELSE 0 END) AS admins
        FROM users
        WHERE strftime('%Y', created_at) = ?
        GROUP BY month
        ORDER BY month
        "#,
    )
    .bind(format!("{:04}", year))
    .fetch_all(pool)
    .await
    .context("Failed to aggregate monthly role counts")?;

    let mut counts = Vec::new();
    for row in rows {
        let month: i64 = row.get("month");
        counts.push(MonthlyRoleRow {
            month: month as u32,
            readers: row.get("readers"),
            journalists: row.get("journalists"),
            admins: row.get("admins"),
        });
    }

    Ok(counts)
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        role,
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateUserInput) -> Result<User> {
    let now = Utc::now();
    let role = input.role.unwrap_or_default();

    let result = sqlx::query(
        r#"
        INSERT INTO users (full_name, email, role, is_deleted, created_at, updated_at)
        VALUES (?, ?, ?, FALSE, ?, ?)
        "#,
    )
    .bind(&input.full_name)
    .bind(&input.email)
    .bind(role.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_id() as i64,
        full_name: input.full_name.clone(),
        email: input.email.clone(),
        role,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, full_name, email, role, is_deleted, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_user_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_by_email_mysql(pool: &MySqlPool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, full_name, email, role, is_deleted, created_at, updated_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by email")?;

    match row {
        Some(row) => Ok(Some(row_to_user_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn set_role_mysql(pool: &MySqlPool, id: i64, role: UserRole) -> Result<Option<User>> {
    let now = Utc::now();

    // MySQL reports zero affected rows for a no-change update, so existence
    // is decided by the read-back rather than rows_affected
    sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role.to_string())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update user role")?;

    get_by_id_mysql(pool, id).await
}

async fn mark_deleted_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let now = Utc::now();

    let result = sqlx::query("UPDATE users SET is_deleted = TRUE, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to soft-delete user")?;

    if result.rows_affected() > 0 {
        return Ok(true);
    }

    // Re-deleting an already-deleted row changes nothing under MySQL's
    // affected-rows accounting but must still count as found
    Ok(get_by_id_mysql(pool, id).await?.is_some())
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT id, full_name, email, role, is_deleted, created_at, updated_at
        FROM users
        WHERE is_deleted = FALSE
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row_to_user_mysql(&row)?);
    }

    Ok(users)
}

async fn count_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

async fn role_counts_by_month_mysql(pool: &MySqlPool, year: i32) -> Result<Vec<MonthlyRoleRow>> {
    // MySQL SUM() yields DECIMAL, so cast the counters back to integers
    let rows = sqlx::query(
        r#"
        SELECT CAST(MONTH(created_at) AS SIGNED) AS month,
               CAST(SUM(CASE WHEN role = 'reader' THEN 1 ELSE 0 END) AS SIGNED) AS readers,
               CAST(SUM(CASE WHEN role = 'journalist' THEN 1 ELSE 0 END) AS SIGNED) AS journalists,
               CAST(SUM(CASE WHEN role = 'admin' THEN 1 ELSE 0 END) AS SIGNED) AS admins
        FROM users
        WHERE YEAR(created_at) = ?
        GROUP BY month
        ORDER BY month
        "#,
    )
    .bind(year)
    .fetch_all(pool)
    .await
    .context("Failed to aggregate monthly role counts")?;

    let mut counts = Vec::new();
    for row in rows {
        let month: i64 = row.get("month");
        counts.push(MonthlyRoleRow {
            month: month as u32,
            readers: row.get("readers"),
            journalists: row.get("journalists"),
            admins: row.get("admins"),
        });
    }

    Ok(counts)
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        role,
        is_deleted: row.get("is_deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::TimeZone;

    async fn setup_test_repo() -> (DynDatabasePool, SqlxUserRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxUserRepository::new(pool.clone());
        (pool, repo)
    }

    fn test_input(name: &str, email: &str, role: UserRole) -> CreateUserInput {
        CreateUserInput {
            full_name: name.to_string(),
            email: email.to_string(),
            role: Some(role),
        }
    }

    #[tokio::test]
    async fn test_create_user() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&test_input("Ada Reader", "ada@example.com", UserRole::Reader))
            .await
            .expect("Failed to create user");

        assert!(created.id > 0);
        assert_eq!(created.full_name, "Ada Reader");
        assert_eq!(created.email, "ada@example.com");
        assert_eq!(created.role, UserRole::Reader);
        assert!(!created.is_deleted);
    }

    #[tokio::test]
    async fn test_create_user_defaults_to_reader() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&CreateUserInput {
                full_name: "No Role".to_string(),
                email: "norole@example.com".to_string(),
                role: None,
            })
            .await
            .expect("Failed to create user");

        assert_eq!(created.role, UserRole::Reader);
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&test_input("Find Me", "findme@example.com", UserRole::Reader))
            .await
            .expect("Failed to create user");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get user")
            .expect("User not found");

        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "findme@example.com");
    }

    #[tokio::test]
    async fn test_get_user_by_id_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo.get_by_id(999).await.expect("Failed to get user");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_user_by_email() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&test_input("Email User", "unique@example.com", UserRole::Reader))
            .await
            .expect("Failed to create user");

        let found = repo
            .get_by_email("unique@example.com")
            .await
            .expect("Failed to get user")
            .expect("User not found");

        assert_eq!(found.email, "unique@example.com");
    }

    #[tokio::test]
    async fn test_set_role() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&test_input("Promote Me", "promote@example.com", UserRole::Reader))
            .await
            .expect("Failed to create user");

        let updated = repo
            .set_role(created.id, UserRole::Journalist)
            .await
            .expect("Failed to set role")
            .expect("User not found");

        assert_eq!(updated.role, UserRole::Journalist);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_set_role_missing_user() {
        let (_pool, repo) = setup_test_repo().await;

        let updated = repo
            .set_role(12345, UserRole::Admin)
            .await
            .expect("Query should succeed");

        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_set_role_same_value_converges() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&test_input("Same", "same@example.com", UserRole::Reader))
            .await
            .expect("Failed to create user");

        repo.set_role(created.id, UserRole::Journalist)
            .await
            .expect("First write failed");
        let second = repo
            .set_role(created.id, UserRole::Journalist)
            .await
            .expect("Second write failed")
            .expect("User not found");

        assert_eq!(second.role, UserRole::Journalist);
    }

    #[tokio::test]
    async fn test_mark_deleted_hides_from_listing() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&test_input("Delete Me", "delete@example.com", UserRole::Reader))
            .await
            .expect("Failed to create user");

        let found = repo.mark_deleted(created.id).await.expect("Delete failed");
        assert!(found);

        // The row still exists but is hidden from the active listing
        let user = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get user")
            .expect("Row should remain");
        assert!(user.is_deleted);

        let listed = repo.list().await.expect("Failed to list users");
        assert!(listed.iter().all(|u| u.id != created.id));
    }

    #[tokio::test]
    async fn test_mark_deleted_missing_user() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo.mark_deleted(999).await.expect("Query should succeed");

        assert!(!found);
    }

    #[tokio::test]
    async fn test_count_users() {
        let (_pool, repo) = setup_test_repo().await;

        assert_eq!(repo.count().await.expect("Failed to count"), 0);

        repo.create(&test_input("A", "a@example.com", UserRole::Reader))
            .await
            .expect("Failed to create user");
        repo.create(&test_input("B", "b@example.com", UserRole::Admin))
            .await
            .expect("Failed to create user");

        assert_eq!(repo.count().await.expect("Failed to count"), 2);
    }

    #[tokio::test]
    async fn test_unique_email_constraint() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create(&test_input("First", "dup@example.com", UserRole::Reader))
            .await
            .expect("Failed to create first user");
        let result = repo
            .create(&test_input("Second", "dup@example.com", UserRole::Reader))
            .await;

        assert!(result.is_err(), "Should fail due to duplicate email");
    }

    #[tokio::test]
    async fn test_role_counts_by_month() {
        let (pool, repo) = setup_test_repo().await;
        let sqlite = pool.as_sqlite().unwrap();

        // Seed accounts with controlled creation timestamps
        let seed = [
            ("r1@example.com", "reader", Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()),
            ("r2@example.com", "reader", Utc.with_ymd_and_hms(2024, 3, 20, 10, 0, 0).unwrap()),
            ("j1@example.com", "journalist", Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap()),
            ("a1@example.com", "admin", Utc.with_ymd_and_hms(2024, 11, 1, 10, 0, 0).unwrap()),
            // Different year, must be filtered out
            ("old@example.com", "reader", Utc.with_ymd_and_hms(2023, 3, 1, 10, 0, 0).unwrap()),
        ];
        for (email, role, created_at) in seed {
            sqlx::query(
                "INSERT INTO users (full_name, email, role, is_deleted, created_at, updated_at) \
                 VALUES (?, ?, ?, 0, ?, ?)",
            )
            .bind("Seeded")
            .bind(email)
            .bind(role)
            .bind(created_at)
            .bind(created_at)
            .execute(sqlite)
            .await
            .expect("Failed to seed user");
        }

        let counts = repo
            .role_counts_by_month(2024)
            .await
            .expect("Aggregation failed");

        assert_eq!(counts.len(), 2);
        assert_eq!(
            counts[0],
            MonthlyRoleRow { month: 3, readers: 2, journalists: 1, admins: 0 }
        );
        assert_eq!(
            counts[1],
            MonthlyRoleRow { month: 11, readers: 0, journalists: 0, admins: 1 }
        );
    }

    #[tokio::test]
    async fn test_role_counts_by_month_empty_year() {
        let (_pool, repo) = setup_test_repo().await;

        let counts = repo
            .role_counts_by_month(1999)
            .await
            .expect("Aggregation failed");

        assert!(counts.is_empty());
    }
}
