//! Admin API endpoints
//!
//! HTTP surface for the moderation and identity workflows:
//! - Dashboard metrics and monthly growth
//! - Article review (list, detail, status decision)
//! - Journalist application review
//! - User role changes and identity soft deletion
//! - Comment listing
//!
//! All routes sit behind the gateway-trust admin check wired in
//! `api::build_router`.

use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{
    ArticleDetailResponse, ArticleListResponse, CommentListResponse, DashboardResponse,
    JournalistListResponse, MessageResponse, MonthlyGrowthResponse, UserListResponse,
};

/// Request body for a moderation decision
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Request body for a role change
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        // Dashboard metrics
        .route("/dashboard", get(get_dashboard))
        // Manage articles
        .route("/articles", get(list_articles))
        .route("/articles/{id}", get(get_article))
        .route("/articles/{id}/status", put(update_article_status))
        // Manage journalist applications
        .route("/journalists", get(list_journalists))
        .route("/journalists/{id}/status", put(set_journalist_status))
        // Manage users
        .route("/users", get(list_users))
        .route("/users/{id}/role", put(change_user_role))
        .route("/users/{id}", delete(soft_delete_identity))
        // Monthly user growth data
        .route("/growth/monthly", get(monthly_growth))
        // Retrieve comments
        .route("/comments", get(list_comments))
}

/// GET /api/admin/dashboard - Dashboard counters
async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let data = state.metrics_service.snapshot().await?;

    Ok(Json(DashboardResponse {
        success: true,
        data,
    }))
}

/// GET /api/admin/articles - List all articles
async fn list_articles(State(state): State<AppState>) -> Result<Json<ArticleListResponse>, ApiError> {
    let articles = state.moderation_service.list().await?;

    Ok(Json(ArticleListResponse {
        success: true,
        articles: articles.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/admin/articles/{id} - Get a single article
async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArticleDetailResponse>, ApiError> {
    let article = state.moderation_service.get(id).await?;

    Ok(Json(ArticleDetailResponse {
        success: true,
        article: article.into(),
    }))
}

/// PUT /api/admin/articles/{id}/status - Apply a moderation decision
async fn update_article_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<ArticleDetailResponse>, ApiError> {
    let article = state
        .moderation_service
        .update_status(id, &body.status)
        .await?;

    Ok(Json(ArticleDetailResponse {
        success: true,
        article: article.into(),
    }))
}

/// GET /api/admin/journalists - List all journalist applications
async fn list_journalists(
    State(state): State<AppState>,
) -> Result<Json<JournalistListResponse>, ApiError> {
    let journalists = state.identity_service.list_journalists().await?;

    Ok(Json(JournalistListResponse {
        success: true,
        journalists: journalists.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/admin/journalists/{id}/status - Approve or reject an application
///
/// Approval promotes the linked user in a second step; rejection is a
/// single-document update.
async fn set_journalist_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    match body.status.as_str() {
        "approved" => {
            state.identity_service.approve_journalist(id).await?;
            Ok(Json(MessageResponse::ok("Journalist approved successfully")))
        }
        "rejected" => {
            state.identity_service.reject_journalist(id).await?;
            Ok(Json(MessageResponse::ok("Journalist rejected successfully")))
        }
        other => Err(ApiError::validation_error(format!(
            "Invalid status: {}",
            other
        ))),
    }
}

/// GET /api/admin/users - List all users
async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    let users = state.identity_service.list_users().await?;

    Ok(Json(UserListResponse {
        success: true,
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/admin/users/{id}/role - Overwrite a user's role
async fn change_user_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RoleRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = state.identity_service.change_user_role(id, &body.role).await?;

    Ok(Json(MessageResponse::ok(format!(
        "User role updated to {}",
        user.role
    ))))
}

/// DELETE /api/admin/users/{id} - Soft-delete an identity
///
/// Probes the user collection first, then the journalist collection.
async fn soft_delete_identity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.identity_service.soft_delete(id).await?;

    let message = match deleted {
        crate::services::DeletedIdentity::User => "User soft-deleted successfully",
        crate::services::DeletedIdentity::Journalist => "Journalist soft-deleted successfully",
    };

    Ok(Json(MessageResponse::ok(message)))
}

/// GET /api/admin/growth/monthly - Monthly user growth for the current year
async fn monthly_growth(
    State(state): State<AppState>,
) -> Result<Json<MonthlyGrowthResponse>, ApiError> {
    let year = Utc::now().year();
    let data = state.metrics_service.monthly_growth(year).await?;

    Ok(Json(MonthlyGrowthResponse {
        success: true,
        data,
    }))
}

/// GET /api/admin/comments - List all comments
async fn list_comments(
    State(state): State<AppState>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let comments = state
        .comment_repo
        .list()
        .await
        .map_err(|e| ApiError::store_error(e.to_string()))?;

    Ok(Json(CommentListResponse {
        success: true,
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}
