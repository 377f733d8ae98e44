//! Data models
//!
//! This module contains all data structures used throughout the Newsdesk
//! moderation backend. Models represent:
//! - Database entities (User, Journalist, Article, Comment)
//! - Status/role enumerations with fallible boundary parsing
//! - Shared aggregation result types

mod article;
mod comment;
mod journalist;
mod user;

pub use article::{Article, ArticleStatus, CreateArticleInput};
pub use comment::{Comment, CreateCommentInput};
pub use journalist::{ApplicationStatus, Journalist};
pub use user::{CreateUserInput, User, UserRole};

use serde::{Deserialize, Serialize};

/// Counts of review records grouped by status.
///
/// Returned by the grouped aggregation queries for articles and journalist
/// applications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl ReviewCounts {
    /// Total records across all statuses
    pub fn total(&self) -> i64 {
        self.pending + self.approved + self.rejected
    }
}
