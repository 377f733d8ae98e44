//! Shared API response types
//!
//! Common response structures used across the admin endpoints. Every
//! success envelope carries an explicit `success` flag next to its payload,
//! mirroring the error shape in `middleware::ApiError`.

use serde::{Deserialize, Serialize};

use crate::services::{DashboardSnapshot, MonthlyGrowth};

// ============================================================================
// Entity response types
// ============================================================================

/// Full article response
#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub status: String,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// User response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Journalist application response
#[derive(Debug, Serialize, Deserialize)]
pub struct JournalistResponse {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Comment response
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: String,
}

// ============================================================================
// Envelopes
// ============================================================================

/// Generic success envelope carrying only a message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Article listing envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleListResponse {
    pub success: bool,
    pub articles: Vec<ArticleResponse>,
}

/// Single-article envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleDetailResponse {
    pub success: bool,
    pub article: ArticleResponse,
}

/// Journalist listing envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct JournalistListResponse {
    pub success: bool,
    pub journalists: Vec<JournalistResponse>,
}

/// User listing envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserResponse>,
}

/// Comment listing envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub success: bool,
    pub comments: Vec<CommentResponse>,
}

/// Dashboard counters envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub data: DashboardSnapshot,
}

/// Monthly growth envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct MonthlyGrowthResponse {
    pub success: bool,
    pub data: Vec<MonthlyGrowth>,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<crate::models::Article> for ArticleResponse {
    fn from(article: crate::models::Article) -> Self {
        Self {
            id: article.id,
            author_id: article.author_id,
            title: article.title,
            content: article.content,
            status: article.status.to_string(),
            view_count: article.view_count,
            like_count: article.like_count,
            comment_count: article.comment_count,
            created_at: article.created_at.to_rfc3339(),
            updated_at: article.updated_at.to_rfc3339(),
        }
    }
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            role: user.role.to_string(),
            is_deleted: user.is_deleted,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

impl From<crate::models::Journalist> for JournalistResponse {
    fn from(journalist: crate::models::Journalist) -> Self {
        Self {
            id: journalist.id,
            user_id: journalist.user_id,
            status: journalist.status.to_string(),
            is_deleted: journalist.is_deleted,
            created_at: journalist.created_at.to_rfc3339(),
            updated_at: journalist.updated_at.to_rfc3339(),
        }
    }
}

impl From<crate::models::Comment> for CommentResponse {
    fn from(comment: crate::models::Comment) -> Self {
        Self {
            id: comment.id,
            article_id: comment.article_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}
