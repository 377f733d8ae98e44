//! Article moderation service
//!
//! Implements business logic for the article review workflow:
//! - Transitioning a submission's review status
//! - Article lookups and listings for the moderation views
//!
//! Status updates are idempotent single-row overwrites. Concurrent updates
//! to the same article are last-writer-wins; there is no conflict detection
//! because moderation assumes a single reviewer per article at a time.

use crate::db::repositories::ArticleRepository;
use crate::models::{Article, ArticleStatus};
use anyhow::Context;
use std::sync::Arc;

/// Error types for moderation operations
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    /// Article not found
    #[error("Article not found: {0}")]
    NotFound(i64),

    /// Validation error (input outside the allowed decisions)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage error; safe to retry, the operation is idempotent
    #[error("Storage error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Moderation service for reviewing article submissions
pub struct ModerationService {
    repo: Arc<dyn ArticleRepository>,
}

impl ModerationService {
    /// Create a new moderation service
    pub fn new(repo: Arc<dyn ArticleRepository>) -> Self {
        Self { repo }
    }

    /// Apply a moderation decision to an article.
    ///
    /// The decision must parse to `approved` or `rejected`; anything else
    /// (including `pending`) is a validation error and nothing is written.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the decision is not an allowed status
    /// - `NotFound` if no article has the given id
    pub async fn update_status(
        &self,
        article_id: i64,
        decision: &str,
    ) -> Result<Article, ModerationError> {
        let status = ArticleStatus::from_str(decision)
            .filter(ArticleStatus::is_decision)
            .ok_or_else(|| {
                ModerationError::ValidationError(format!("Invalid status provided: {}", decision))
            })?;

        let article = self
            .repo
            .set_status(article_id, status)
            .await
            .context("Failed to update article status")?
            .ok_or(ModerationError::NotFound(article_id))?;

        tracing::info!(article_id, status = %status, "article status updated");

        Ok(article)
    }

    /// Get a single article by id
    pub async fn get(&self, article_id: i64) -> Result<Article, ModerationError> {
        self.repo
            .get_by_id(article_id)
            .await
            .context("Failed to get article")?
            .ok_or(ModerationError::NotFound(article_id))
    }

    /// List all articles, newest first
    pub async fn list(&self) -> Result<Vec<Article>, ModerationError> {
        Ok(self.repo.list().await.context("Failed to list articles")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxArticleRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreateArticleInput;

    async fn setup() -> (ModerationService, Arc<dyn ArticleRepository>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxArticleRepository::boxed(pool);
        (ModerationService::new(repo.clone()), repo)
    }

    async fn submit(repo: &Arc<dyn ArticleRepository>, title: &str) -> Article {
        repo.create(&CreateArticleInput {
            author_id: 1,
            title: title.to_string(),
            content: "Body".to_string(),
        })
        .await
        .expect("Failed to create article")
    }

    #[tokio::test]
    async fn test_approve_then_read_back() {
        let (service, repo) = setup().await;
        let article = submit(&repo, "Pending piece").await;

        let updated = service
            .update_status(article.id, "approved")
            .await
            .expect("Update should succeed");
        assert_eq!(updated.status, ArticleStatus::Approved);

        let stored = service.get(article.id).await.expect("Get should succeed");
        assert_eq!(stored.status, ArticleStatus::Approved);
    }

    #[tokio::test]
    async fn test_reject_then_read_back() {
        let (service, repo) = setup().await;
        let article = submit(&repo, "Bad piece").await;

        service
            .update_status(article.id, "rejected")
            .await
            .expect("Update should succeed");

        let stored = service.get(article.id).await.expect("Get should succeed");
        assert_eq!(stored.status, ArticleStatus::Rejected);
    }

    #[tokio::test]
    async fn test_invalid_decision_leaves_status_unchanged() {
        let (service, repo) = setup().await;
        let article = submit(&repo, "Untouched").await;

        for decision in ["published", "draft", "", "PENDING"] {
            let result = service.update_status(article.id, decision).await;
            assert!(
                matches!(result, Err(ModerationError::ValidationError(_))),
                "decision {:?} should be rejected",
                decision
            );
        }

        let stored = service.get(article.id).await.expect("Get should succeed");
        assert_eq!(stored.status, ArticleStatus::Pending);
    }

    #[tokio::test]
    async fn test_pending_is_not_a_valid_decision() {
        let (service, repo) = setup().await;
        let article = submit(&repo, "Back to pending?").await;
        service
            .update_status(article.id, "approved")
            .await
            .expect("Update should succeed");

        // pending is a valid stored status but not an allowed decision
        let result = service.update_status(article.id, "pending").await;
        assert!(matches!(result, Err(ModerationError::ValidationError(_))));

        let stored = service.get(article.id).await.expect("Get should succeed");
        assert_eq!(stored.status, ArticleStatus::Approved);
    }

    #[tokio::test]
    async fn test_unknown_article_is_not_found() {
        let (service, _repo) = setup().await;

        let result = service.update_status(404, "approved").await;

        assert!(matches!(result, Err(ModerationError::NotFound(404))));
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let (service, repo) = setup().await;
        let article = submit(&repo, "Twice").await;

        let first = service
            .update_status(article.id, "approved")
            .await
            .expect("First update failed");
        let second = service
            .update_status(article.id, "approved")
            .await
            .expect("Second update failed");

        assert_eq!(first.status, second.status);
        assert_eq!(
            service.get(article.id).await.expect("get").status,
            ArticleStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_sequential_updates_are_last_writer_wins() {
        let (service, repo) = setup().await;
        let article = submit(&repo, "Contested").await;

        service
            .update_status(article.id, "approved")
            .await
            .expect("First update failed");
        service
            .update_status(article.id, "rejected")
            .await
            .expect("Second update failed");

        let stored = service.get(article.id).await.expect("Get should succeed");
        assert_eq!(stored.status, ArticleStatus::Rejected);
    }

    #[tokio::test]
    async fn test_concurrent_same_decision_converges() {
        let (service, repo) = setup().await;
        let article = submit(&repo, "Raced").await;

        let (a, b) = tokio::join!(
            service.update_status(article.id, "approved"),
            service.update_status(article.id, "approved"),
        );
        a.expect("First writer failed");
        b.expect("Second writer failed");

        let stored = service.get(article.id).await.expect("Get should succeed");
        assert_eq!(stored.status, ArticleStatus::Approved);
    }

    #[tokio::test]
    async fn test_every_valid_decision_is_reachable_from_any_state() {
        let (service, repo) = setup().await;
        let article = submit(&repo, "Flip flop").await;

        // No transition table: approved -> rejected -> approved all legal
        for decision in ["approved", "rejected", "approved"] {
            service
                .update_status(article.id, decision)
                .await
                .expect("Update should succeed");
        }

        let stored = service.get(article.id).await.expect("Get should succeed");
        assert_eq!(stored.status, ArticleStatus::Approved);
    }

    #[tokio::test]
    async fn test_list_returns_all_articles() {
        let (service, repo) = setup().await;
        submit(&repo, "One").await;
        submit(&repo, "Two").await;

        let articles = service.list().await.expect("List should succeed");
        assert_eq!(articles.len(), 2);
    }
}
