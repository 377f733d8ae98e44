//! Identity lifecycle service
//!
//! Implements business logic for the identity workflow:
//! - Approving/rejecting journalist applications
//! - Reassigning user roles
//! - Soft-deleting identities across the user and journalist collections
//!
//! Approval spans two independently stored aggregates (the application and
//! the user) with no shared transaction. The two writes are ordered so any
//! crash-induced partial state is self-describing: an approved application
//! whose user was never promoted is found and re-driven by simply invoking
//! the operation again. Every step is an idempotent overwrite, so replays
//! and concurrent duplicates converge to the same stored values.

use crate::db::repositories::{JournalistRepository, UserRepository};
use crate::models::{ApplicationStatus, Journalist, User, UserRole};
use anyhow::Context;
use std::str::FromStr;
use std::sync::Arc;

/// Error types for identity lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Validation error (input outside the allowed enumeration)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An approved application references a user that no longer exists.
    /// The application stays approved; the promotion needs manual
    /// reconciliation (or a retry once the user reappears).
    #[error("Journalist {journalist_id} references missing user {user_id}")]
    OrphanedReference { journalist_id: i64, user_id: i64 },

    /// Storage error; safe to retry, every operation is idempotent
    #[error("Storage error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Which collection a soft-deleted identity was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletedIdentity {
    User,
    Journalist,
}

/// Identity lifecycle service
pub struct IdentityService {
    user_repo: Arc<dyn UserRepository>,
    journalist_repo: Arc<dyn JournalistRepository>,
}

impl IdentityService {
    /// Create a new identity service
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        journalist_repo: Arc<dyn JournalistRepository>,
    ) -> Self {
        Self {
            user_repo,
            journalist_repo,
        }
    }

    /// Approve a journalist application and promote the linked user.
    ///
    /// Two locally committed steps, in this order:
    /// 1. Persist status=approved on the application (`NotFound` if absent).
    /// 2. Overwrite the linked user's role to journalist.
    ///
    /// If the user is gone the application remains approved and
    /// `OrphanedReference` is returned; re-invoking after a crash between
    /// the steps re-applies step 1 as a no-op and completes step 2.
    pub async fn approve_journalist(&self, journalist_id: i64) -> Result<Journalist, IdentityError> {
        let journalist = self
            .journalist_repo
            .set_status(journalist_id, ApplicationStatus::Approved)
            .await
            .context("Failed to approve journalist application")?
            .ok_or_else(|| {
                IdentityError::NotFound(format!("Journalist {} not found", journalist_id))
            })?;

        let promoted = self
            .user_repo
            .set_role(journalist.user_id, UserRole::Journalist)
            .await
            .context("Failed to promote user to journalist")?;

        match promoted {
            Some(user) => {
                tracing::info!(
                    journalist_id,
                    user_id = user.id,
                    "journalist approved and user promoted"
                );
                Ok(journalist)
            }
            None => {
                // The application is now approved but unpromoted; keep that
                // state visible in the logs for reconciliation
                tracing::warn!(
                    journalist_id,
                    user_id = journalist.user_id,
                    "approved journalist references a missing user"
                );
                Err(IdentityError::OrphanedReference {
                    journalist_id,
                    user_id: journalist.user_id,
                })
            }
        }
    }

    /// Reject a journalist application.
    ///
    /// Single-document update; no cross-aggregate step.
    pub async fn reject_journalist(&self, journalist_id: i64) -> Result<Journalist, IdentityError> {
        let journalist = self
            .journalist_repo
            .set_status(journalist_id, ApplicationStatus::Rejected)
            .await
            .context("Failed to reject journalist application")?
            .ok_or_else(|| {
                IdentityError::NotFound(format!("Journalist {} not found", journalist_id))
            })?;

        tracing::info!(journalist_id, "journalist application rejected");

        Ok(journalist)
    }

    /// Overwrite a user's role.
    ///
    /// The role must parse to reader, journalist or admin. No journalist
    /// application record is touched, in either direction.
    pub async fn change_user_role(&self, user_id: i64, role: &str) -> Result<User, IdentityError> {
        let role = UserRole::from_str(role)
            .map_err(|_| IdentityError::ValidationError(format!("Invalid role: {}", role)))?;

        let user = self
            .user_repo
            .set_role(user_id, role)
            .await
            .context("Failed to change user role")?
            .ok_or_else(|| IdentityError::NotFound(format!("User {} not found", user_id)))?;

        tracing::info!(user_id, role = %role, "user role changed");

        Ok(user)
    }

    /// Soft-delete an identity by id.
    ///
    /// The user and journalist collections share an id namespace only by
    /// convention, so the probe order is fixed: the user collection is
    /// checked first and always wins for a colliding id; the journalist
    /// collection is only consulted when no user matched.
    pub async fn soft_delete(&self, id: i64) -> Result<DeletedIdentity, IdentityError> {
        if self
            .user_repo
            .mark_deleted(id)
            .await
            .context("Failed to soft-delete user")?
        {
            tracing::info!(id, "user soft-deleted");
            return Ok(DeletedIdentity::User);
        }

        if self
            .journalist_repo
            .mark_deleted(id)
            .await
            .context("Failed to soft-delete journalist")?
        {
            tracing::info!(id, "journalist soft-deleted");
            return Ok(DeletedIdentity::Journalist);
        }

        Err(IdentityError::NotFound(format!(
            "No user or journalist with id {}",
            id
        )))
    }

    /// List all active users
    pub async fn list_users(&self) -> Result<Vec<User>, IdentityError> {
        Ok(self.user_repo.list().await.context("Failed to list users")?)
    }

    /// List all active journalist applications
    pub async fn list_journalists(&self) -> Result<Vec<Journalist>, IdentityError> {
        Ok(self
            .journalist_repo
            .list()
            .await
            .context("Failed to list journalists")?)
    }
}
