//! Article repository
//!
//! Database operations for article submissions. The moderation core only
//! ever rewrites the status column; engagement counters are owned by other
//! parts of the platform and merely read back here.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Article, ArticleStatus, CreateArticleInput, ReviewCounts};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create a new pending article submission
    async fn create(&self, input: &CreateArticleInput) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Overwrite an article's status, returning the updated article.
    /// Returns `None` if no article has the given id.
    async fn set_status(&self, id: i64, status: ArticleStatus) -> Result<Option<Article>>;

    /// List all articles, newest first
    async fn list(&self) -> Result<Vec<Article>>;

    /// Count articles grouped by status
    async fn count_by_status(&self) -> Result<ReviewCounts>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, input: &CreateArticleInput) -> Result<Article> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn set_status(&self, id: i64, status: ArticleStatus) -> Result<Option<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_status_sqlite(self.pool.as_sqlite().unwrap(), id, status).await
            }
            DatabaseDriver::Mysql => {
                set_status_mysql(self.pool.as_mysql().unwrap(), id, status).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Article>> {
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

async fn create_sqlite(pool: &SqlitePool, input: &CreateArticleInput) -> Result<Article> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO articles (author_id, title, content, status, view_count, like_count, comment_count, created_at, updated_at)
        VALUES (?, ?, ?, 'pending', 0, 0, 0, ?, ?)
        "#,
    )
    .bind(input.author_id)
    .bind(&input.title)
    .bind(&input.content)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(Article {
        id: result.last_insert_rowid(),
        author_id: input.author_id,
        title: input.title.clone(),
        content: input.content.clone(),
        status: ArticleStatus::Pending,
        view_count: 0,
        like_count: 0,
        comment_count: 0,
        created_at: now,
        updated_at: now,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(
        r#"
        SELECT id, author_id, title, content, status, view_count, like_count, comment_count, created_at, updated_at
        FROM articles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get article by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_article_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn set_status_sqlite(
    pool: &SqlitePool,
    id: i64,
    status: ArticleStatus,
) -> Result<Option<Article>> {
    let now = Utc::now();

    sqlx::query("UPDATE articles SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update article status")?;

    get_by_id_sqlite(pool, id).await
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Article>> {
    let rows = sqlx::query(
        r#"
        SELECT id, author_id, title, content, status, view_count, like_count, comment_count, created_at, updated_at
        FROM articles
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list articles")?;

    let mut articles = Vec::new();
    for row in rows {
        articles.push(row_to_article_sqlite(&row)?);
    }

    Ok(articles)
}

async fn count_by_status_sqlite(pool: &SqlitePool) -> Result<ReviewCounts> {
    let rows = sqlx::query("SELECT status, COUNT(*) as count FROM articles GROUP BY status")
        .fetch_all(pool)
        .await
        .context("Failed to count articles by status")?;

    fold_status_counts(rows.iter().map(|row| (row.get("status"), row.get("count"))))
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let status_str: String = row.get("status");
    let status = ArticleStatus::from_str(&status_str)
        .with_context(|| format!("Invalid article status in database: {}", status_str))?;

    Ok(Article {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        content: row.get("content"),
        status,
        view_count: row.get("view_count"),
        like_count: row.get("like_count"),
        comment_count: row.get("comment_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateArticleInput) -> Result<Article> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO articles (author_id, title, content, status, view_count, like_count, comment_count, created_at, updated_at)
        VALUES (?, ?, ?, 'pending', 0, 0, 0, ?, ?)
        "#,
    )
    .bind(input.author_id)
    .bind(&input.title)
    .bind(&input.content)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(Article {
        id: result.last_insert_id() as i64,
        author_id: input.author_id,
        title: input.title.clone(),
        content: input.content.clone(),
        status: ArticleStatus::Pending,
        view_count: 0,
        like_count: 0,
        comment_count: 0,
        created_at: now,
        updated_at: now,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(
        r#"
        SELECT id, author_id, title, content, status, view_count, like_count, comment_count, created_at, updated_at
        FROM articles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get article by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_article_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn set_status_mysql(
    pool: &MySqlPool,
    id: i64,
    status: ArticleStatus,
) -> Result<Option<Article>> {
    let now = Utc::now();

    sqlx::query("UPDATE articles SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update article status")?;

    get_by_id_mysql(pool, id).await
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Article>> {
    let rows = sqlx::query(
        r#"
        SELECT id, author_id, title, content, status, view_count, like_count, comment_count, created_at, updated_at
        FROM articles
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list articles")?;

    let mut articles = Vec::new();
    for row in rows {
        articles.push(row_to_article_mysql(&row)?);
    }

    Ok(articles)
}

async fn count_by_status_mysql(pool: &MySqlPool) -> Result<ReviewCounts> {
    let rows = sqlx::query("SELECT status, COUNT(*) as count FROM articles GROUP BY status")
        .fetch_all(pool)
        .await
        .context("Failed to count articles by status")?;

    fold_status_counts(rows.iter().map(|row| (row.get("status"), row.get("count"))))
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Article> {
    let status_str: String = row.get("status");
    let status = ArticleStatus::from_str(&status_str)
        .with_context(|| format!("Invalid article status in database: {}", status_str))?;

    Ok(Article {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        content: row.get("content"),
        status,
        view_count: row.get("view_count"),
        like_count: row.get("like_count"),
        comment_count: row.get("comment_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Fold (status, count) rows into a `ReviewCounts`, rejecting unknown statuses
fn fold_status_counts(rows: impl Iterator<Item = (String, i64)>) -> Result<ReviewCounts> {
    let mut counts = ReviewCounts::default();
    for (status, count) in rows {
        match ArticleStatus::from_str(&status) {
            Some(ArticleStatus::Pending) => counts.pending = count,
            Some(ArticleStatus::Approved) => counts.approved = count,
            Some(ArticleStatus::Rejected) => counts.rejected = count,
            None => anyhow::bail!("Invalid article status in database: {}", status),
        }
    }
    Ok(counts)
}
