//! Article model
//!
//! This module provides:
//! - `Article` entity representing a submitted article
//! - `ArticleStatus` enum for review states
//! - Input type for creating articles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Author user ID (weak reference, may point at a deleted user)
    pub author_id: i64,
    /// Article title
    pub title: String,
    /// Article body
    pub content: String,
    /// Review status
    pub status: ArticleStatus,
    /// View count
    #[serde(default)]
    pub view_count: i64,
    /// Like count
    #[serde(default)]
    pub like_count: i64,
    /// Comment count
    #[serde(default)]
    pub comment_count: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Article review status
///
/// Submissions start out Pending; moderators move them to Approved or
/// Rejected. No transition table is enforced beyond the enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Pending - awaiting review
    Pending,
    /// Approved - visible to readers
    Approved,
    /// Rejected - declined by a moderator
    Rejected,
}

impl Default for ArticleStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl ArticleStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Pending => "pending",
            ArticleStatus::Approved => "approved",
            ArticleStatus::Rejected => "rejected",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ArticleStatus::Pending),
            "approved" => Some(ArticleStatus::Approved),
            "rejected" => Some(ArticleStatus::Rejected),
            _ => None,
        }
    }

    /// Whether this status is a moderation decision (Approved or Rejected).
    ///
    /// Pending is a valid stored status but not a valid decision input.
    pub fn is_decision(&self) -> bool {
        matches!(self, ArticleStatus::Approved | ArticleStatus::Rejected)
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleInput {
    /// Author user ID
    pub author_id: i64,
    /// Article title
    pub title: String,
    /// Article body
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str_roundtrip() {
        for status in [
            ArticleStatus::Pending,
            ArticleStatus::Approved,
            ArticleStatus::Rejected,
        ] {
            assert_eq!(ArticleStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_from_str_case_insensitive() {
        assert_eq!(ArticleStatus::from_str("APPROVED"), Some(ArticleStatus::Approved));
        assert_eq!(ArticleStatus::from_str("Pending"), Some(ArticleStatus::Pending));
    }

    #[test]
    fn test_status_from_str_invalid() {
        assert_eq!(ArticleStatus::from_str("published"), None);
        assert_eq!(ArticleStatus::from_str(""), None);
    }

    #[test]
    fn test_status_is_decision() {
        assert!(ArticleStatus::Approved.is_decision());
        assert!(ArticleStatus::Rejected.is_decision());
        assert!(!ArticleStatus::Pending.is_decision());
    }

    #[test]
    fn test_status_default() {
        assert_eq!(ArticleStatus::default(), ArticleStatus::Pending);
    }
}
